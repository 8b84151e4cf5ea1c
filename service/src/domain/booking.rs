//! Booking definitions.

use std::{iter, str::FromStr, sync::LazyLock};

use common::{define_kind, Day, Money};
use derive_more::{
    AsRef, Display, Error, From, FromStr as DeriveFromStr, Into,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    availability::{BlockedDays, Conflict},
    domain::{guest, listing},
    pricing::PriceBreakdown,
};

/// ID of a booking created by the backend.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    DeriveFromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

/// Candidate stay at a listing: a check-in [`Day`] and a check-out [`Day`].
///
/// Always spans at least one night: a same-day selection is corrected by
/// advancing the check-out to the next day (the minimum-stay rule).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct StayPeriod {
    /// [`Day`] the stay begins on.
    check_in: Day,

    /// [`Day`] the stay ends on.
    check_out: Day,
}

impl StayPeriod {
    /// Creates a new [`StayPeriod`] from the provided boundaries.
    ///
    /// A same-day selection becomes a one-night stay. [`None`] is returned
    /// if the check-out precedes the check-in.
    #[must_use]
    pub fn new(check_in: Day, check_out: Day) -> Option<Self> {
        if check_out < check_in {
            return None;
        }
        let check_out = if check_out == check_in {
            check_in.next()
        } else {
            check_out
        };
        Some(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the [`Day`] this stay begins on.
    #[must_use]
    pub fn check_in(&self) -> Day {
        self.check_in
    }

    /// Returns the [`Day`] this stay ends on.
    #[must_use]
    pub fn check_out(&self) -> Day {
        self.check_out
    }

    /// Returns the number of nights this stay spans.
    #[must_use]
    pub fn nights(&self) -> i64 {
        self.check_in.days_until(self.check_out)
    }

    /// Returns every calendar [`Day`] this stay touches, check-in and
    /// check-out included.
    pub fn days(self) -> impl Iterator<Item = Day> {
        let last = self.check_out;
        iter::successors(Some(self.check_in), move |d| {
            (*d < last).then(|| d.next())
        })
    }
}

/// Existing reservation's stay at a listing, as fetched from the backend.
///
/// Snapshot data: fetched once per listing view and treated as read-only.
/// Every calendar day from check-in through check-out is blocked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BookedStay {
    /// [`Day`] the reserved stay begins on.
    pub check_in: Day,

    /// [`Day`] the reserved stay ends on.
    pub check_out: Day,
}

impl BookedStay {
    /// Returns every blocked calendar [`Day`] of this stay, both boundaries
    /// included.
    ///
    /// Empty if the stored boundaries are reversed.
    pub fn days(self) -> impl Iterator<Item = Day> {
        let last = self.check_out;
        let first = (self.check_in <= last).then_some(self.check_in);
        iter::successors(first, move |d| (*d < last).then(|| d.next()))
    }
}

define_kind! {
    #[doc = "Payment method of a booking."]
    enum PaymentMethod {
        #[doc = "JazzCash mobile wallet."]
        JazzCash = 1,

        #[doc = "Easypaisa mobile wallet."]
        EasyPaisa = 2,

        #[doc = "Cash on arrival at the listing."]
        PayOnArrival = 3,
    }
}

/// Mobile wallet account number: exactly 11 ASCII digits.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct WalletNumber(String);

impl WalletNumber {
    /// Creates a new [`WalletNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`WalletNumber`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`WalletNumber`] invariants:
        /// - Must contain ASCII digits only;
        /// - Must be exactly 11 digits long.
        static REGEX: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^[0-9]{11}$").expect("valid regex"));

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for WalletNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `WalletNumber`")
    }
}

/// Reservation request ready for submission to the backend.
///
/// Built transiently at submit time and handed off: nothing here is kept
/// after the submission outcome is known. Equal inputs build structurally
/// equal requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BookingRequest {
    /// ID of the guest making the reservation.
    pub guest_id: guest::Id,

    /// ID of the listing being reserved.
    pub listing_id: listing::Id,

    /// Requested [`StayPeriod`].
    pub period: StayPeriod,

    /// Total price of the stay, service fee included.
    pub total: Money,

    /// Selected [`PaymentMethod`].
    pub method: PaymentMethod,

    /// [`WalletNumber`] to charge, unless paying on arrival.
    pub wallet: Option<WalletNumber>,
}

impl BookingRequest {
    /// Builds a new [`BookingRequest`], validating its inputs in order:
    /// session presence, then range availability, then payment details.
    ///
    /// Pure construction: nothing is submitted here, and the availability
    /// check is advisory only (the backend re-verifies on submission).
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn build(
        session: Option<&guest::Session>,
        listing_id: listing::Id,
        period: StayPeriod,
        blocked: &BlockedDays,
        breakdown: &PriceBreakdown,
        method: PaymentMethod,
        wallet: Option<&str>,
    ) -> Result<Self, ValidationError> {
        use ValidationError as E;

        let session = session.ok_or(E::Unauthenticated)?;

        blocked.validate(period).map_err(E::DateConflict)?;

        let wallet = match method {
            PaymentMethod::PayOnArrival => None,
            PaymentMethod::JazzCash | PaymentMethod::EasyPaisa => {
                let number = wallet.ok_or(E::MissingPaymentNumber)?;
                Some(
                    WalletNumber::new(number)
                        .ok_or(E::InvalidPaymentNumber)?,
                )
            }
        };

        Ok(Self {
            guest_id: session.guest_id,
            listing_id,
            period,
            total: breakdown.total,
            method,
            wallet,
        })
    }
}

/// Error of validating a [`BookingRequest`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// No guest session is active.
    #[display("no active guest session")]
    Unauthenticated,

    /// Requested stay overlaps an already booked day.
    #[display("{_0}")]
    DateConflict(Conflict),

    /// [`WalletNumber`] is required for the selected [`PaymentMethod`] but
    /// absent.
    #[display("payment number is required for the selected method")]
    MissingPaymentNumber,

    /// Provided payment number is not a valid [`WalletNumber`].
    #[display("payment number must be exactly 11 digits")]
    InvalidPaymentNumber,
}
