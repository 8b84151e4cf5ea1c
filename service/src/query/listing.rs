//! [`Query`] collection related to a [`Listing`].

use common::operations::By;

use crate::domain::{listing, Listing};
#[cfg(doc)]
use crate::Query;

use super::BackendQuery;

/// Queries a [`Listing`] projection by its ID.
pub type ById = BackendQuery<By<Option<Listing>, listing::Id>>;
