//! [`Backend`]-related implementations.

#[cfg(feature = "http")]
pub mod http;

use derive_more::{Display, Error as StdError, From};

#[cfg(doc)]
use common::operations::{Check, Toggle};

use crate::domain::{booking::StayPeriod, guest, listing};

#[cfg(feature = "http")]
pub use self::http::Http;

/// Hosted backend operation.
///
/// The remote marketplace backend is the authority on bookings: everything
/// this core computes locally is advisory, and the backend re-verifies on
/// every mutation.
pub use common::Handler as Backend;

/// [`Backend`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Backend detected an overlapping booking for the requested stay.
    #[display("an overlapping booking already exists")]
    Overlap,

    /// Backend rejected the payment.
    #[display("payment was rejected")]
    PaymentRejected,

    #[cfg(feature = "http")]
    /// [`Http`] transport or decoding error.
    #[display("`Http` backend error: {_0}")]
    Http(http::Error),
}

/// Arguments of the authoritative overlap [`Check`] performed by the
/// backend.
#[derive(Clone, Copy, Debug)]
pub struct OverlappingBooking {
    /// ID of the guest asking to book.
    pub guest_id: guest::Id,

    /// ID of the listing being booked.
    pub listing_id: listing::Id,

    /// Requested [`StayPeriod`].
    pub period: StayPeriod,
}

/// Arguments of the wishlist-membership [`Toggle`].
#[derive(Clone, Copy, Debug)]
pub struct WishlistEntry {
    /// ID of the guest owning the wishlist.
    pub guest_id: guest::Id,

    /// ID of the listing being (un)wishlisted.
    pub listing_id: listing::Id,
}
