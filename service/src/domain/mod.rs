//! Domain definitions.

pub mod booking;
pub mod guest;
pub mod listing;

pub use self::{booking::BookingRequest, guest::Session, listing::Listing};
