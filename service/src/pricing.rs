//! Price derivation for a stay.

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::booking::StayPeriod;

/// Derived price of a stay at a listing.
///
/// Purely a function of the nightly rate, the stay and the fee rate: the
/// subtotal carries no intermediate rounding, the service fee is rounded to
/// whole currency units, and the total is their exact sum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PriceBreakdown {
    /// Number of nights priced.
    pub nights: i64,

    /// Price of a single night.
    pub nightly_rate: Money,

    /// Nightly rate multiplied by the number of nights, unrounded.
    pub subtotal: Money,

    /// Fee rate this breakdown was computed with.
    pub service_fee_rate: Percent,

    /// Service fee: the rate applied to the subtotal, rounded to whole
    /// currency units.
    pub service_fee: Money,

    /// Final price: subtotal plus service fee, exactly.
    pub total: Money,
}

impl PriceBreakdown {
    /// Computes a new [`PriceBreakdown`] for a stay.
    ///
    /// Degenerate inputs (a zero or negative nightly rate) are computed
    /// arithmetically rather than rejected: whether such listings are
    /// sellable is not this function's call.
    #[must_use]
    pub fn compute(
        nightly_rate: Money,
        period: StayPeriod,
        service_fee_rate: Percent,
    ) -> Self {
        let nights = period.nights();
        let subtotal = nightly_rate
            .with_amount(nightly_rate.amount * Decimal::from(nights));
        let service_fee = subtotal
            .with_amount(service_fee_rate.of(subtotal.amount))
            .round();
        let total =
            subtotal.with_amount(subtotal.amount + service_fee.amount);

        Self {
            nights,
            nightly_rate,
            subtotal,
            service_fee_rate,
            service_fee,
            total,
        }
    }
}
