//! [`Listing`] definitions.

use std::str::FromStr;

use common::Money;
use derive_more::{AsRef, Display, From, FromStr as DeriveFromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing projection as served by the hosted backend.
///
/// Read-only on this side: listings are created and edited through surfaces
/// out of this core's scope.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Title`] of this [`Listing`].
    pub title: Title,

    /// [`City`] this [`Listing`] is located in.
    pub city: City,

    /// Price of one night's stay at this [`Listing`].
    pub nightly_rate: Money,

    /// Average guest [`Rating`] of this [`Listing`], if it has been rated.
    pub rating: Option<Rating>,

    /// ID of the host offering this [`Listing`].
    pub host_id: HostId,

    /// URLs of this [`Listing`]'s photos.
    pub image_urls: Vec<ImageUrl>,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// ID of the host offering a [`Listing`].
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
pub struct HostId(Uuid);

/// Title of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// City a [`Listing`] is located in.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
pub struct City(String);

/// Average guest rating of a [`Listing`], on a 0 to 5 scale.
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Rating(Decimal);

impl Rating {
    /// Creates a new [`Rating`] by checking the provided value is within the
    /// 0 to 5 scale.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (val >= Decimal::ZERO && val <= Decimal::from(5)).then_some(Self(val))
    }
}

/// URL of a [`Listing`]'s photo.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
pub struct ImageUrl(String);
