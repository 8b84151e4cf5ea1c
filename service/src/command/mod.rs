//! [`Command`] definition.

pub mod submit_booking;
pub mod toggle_wishlist;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    submit_booking::SubmitBooking, toggle_wishlist::ToggleWishlist,
};
