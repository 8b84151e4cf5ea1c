//! Guest definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID of a guest.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Authenticated guest session, issued by the hosted identity provider.
///
/// The session is opaque to this core: it's never created or refreshed here,
/// only passed in explicitly by whoever drives the booking flow. An absent
/// session fails request building with `Unauthenticated`.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the guest this [`Session`] belongs to.
    pub guest_id: Id,

    /// Access [`Token`] of this [`Session`].
    pub access_token: Token,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, From)]
pub struct Token(SecretString);

impl Token {
    /// Creates a new [`Token`] from the provided string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Exposes the underlying secret of this [`Token`].
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
