//! [`Config`]-related definitions.

use std::time;

use common::Percent;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use rust_decimal::Decimal;
use serde::Deserialize;
use service::domain::guest;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Backend configuration.
    pub backend: Backend,

    /// Guest session configuration.
    pub session: Session,

    /// Pricing configuration.
    pub pricing: Pricing,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Backend configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Backend {
    /// Base URL of the hosted backend.
    #[default("http://127.0.0.1:54321".to_owned())]
    pub base_url: String,

    /// Project API key.
    pub api_key: String,

    /// Timeout of a single backend request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

/// Guest session configuration.
///
/// Both fields are absent when no guest is signed in. Token issuance and
/// refresh happen out of band, so both values are taken as opaque here.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Session {
    /// ID of the signed-in guest.
    pub guest_id: Option<guest::Id>,

    /// Access token of the signed-in guest.
    pub access_token: Option<String>,
}

impl Session {
    /// Converts this configuration into a [`guest::Session`], if both its
    /// fields are present.
    #[must_use]
    pub fn into_session(self) -> Option<guest::Session> {
        let Self {
            guest_id,
            access_token,
        } = self;
        Some(guest::Session {
            guest_id: guest_id?,
            access_token: guest::Token::new(access_token?),
        })
    }
}

/// Pricing configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pricing {
    /// Service fee rate, in percents of a stay's subtotal.
    #[default(Percent::new(Decimal::from(5)).unwrap_or_else(|| {
        unreachable!("5 is a valid `Percent`")
    }))]
    pub service_fee: Percent,
}

impl From<Pricing> for service::Config {
    fn from(value: Pricing) -> Self {
        let Pricing { service_fee } = value;
        Self { service_fee }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
