//! Service contains the booking core of the rental marketplace client.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod availability;
pub mod command;
pub mod domain;
pub mod infra;
pub mod pricing;
pub mod query;
pub mod workflow;

use common::Percent;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Service-fee rate applied on top of a stay's nightly subtotal.
    ///
    /// Always supplied by the caller: observed deployments disagree on its
    /// value, so it's never hardcoded.
    pub service_fee: Percent,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<B> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Backend`] of this [`Service`].
    ///
    /// [`Backend`]: infra::Backend
    backend: B,
}

impl<B> Service<B> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, backend: B) -> Self {
        Self { config, backend }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the backend of this [`Service`].
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
