//! [`Query`] collection related to [`BookedStay`]s.

use common::operations::By;

use crate::domain::{booking::BookedStay, listing};
#[cfg(doc)]
use crate::Query;

use super::BackendQuery;

/// Queries the [`BookedStay`]s of a listing.
pub type ForListing = BackendQuery<By<Vec<BookedStay>, listing::Id>>;
