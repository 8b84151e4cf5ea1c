//! Calendar day utilities.

use std::str::FromStr;

use derive_more::{Display, Error};
use time::{
    format_description::BorrowedFormatItem, macros::format_description,
    OffsetDateTime,
};

/// Format of a [`Day`] on the wire (ISO `YYYY-MM-DD`).
const ISO_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Number of seconds in a calendar day.
const SECS_PER_DAY: f64 = 86_400.0;

/// Single calendar day, with no time-of-day attached.
///
/// Booking boundaries are expressed in whole days: a stay checks in on one
/// [`Day`] and checks out on another, and blocking is computed per [`Day`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{:04}-{:02}-{:02}", _0.year(), u8::from(_0.month()), _0.day())]
pub struct Day(time::Date);

impl Day {
    /// Creates a new [`Day`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid calendar
    /// date.
    #[must_use]
    pub fn new(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }

    /// Returns the [`Day`] a timestamp falls on, ignoring its time-of-day.
    #[must_use]
    pub fn from_datetime(dt: OffsetDateTime) -> Self {
        Self(dt.date())
    }

    /// Returns the [`Day`] following this one.
    ///
    /// Saturates at the maximum representable calendar date.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.next_day().unwrap_or(time::Date::MAX))
    }

    /// Returns the signed number of whole days from this [`Day`] until the
    /// `other` one.
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }
}

impl FromStr for Day {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, ISO_DATE)
            .map(Self)
            .map_err(ParseError)
    }
}

/// Error of parsing a [`Day`] from a string.
#[derive(Clone, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

/// Counts the nights between the two provided timestamps.
///
/// The difference is rounded to whole days with standard rounding, so stored
/// timestamps drifting by less than half a day (daylight-saving shifts,
/// stray time-of-day components) still count the expected number of nights.
#[expect(
    clippy::cast_possible_truncation,
    reason = "rounded value fits `i64` for any valid timestamp pair"
)]
#[must_use]
pub fn nights_between(start: OffsetDateTime, end: OffsetDateTime) -> i64 {
    ((end - start).as_seconds_f64() / SECS_PER_DAY).round() as i64
}

#[cfg(feature = "serde")]
mod serde {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::Day;

    impl serde::Serialize for Day {
        fn serialize<S: Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Day {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use time::macros::datetime;

    use super::{nights_between, Day};

    #[test]
    fn from_str() {
        assert_eq!(
            Day::from_str("2024-06-01").unwrap(),
            Day::new(2024, 6, 1).unwrap(),
        );

        assert!(Day::from_str("2024-6-1").is_err());
        assert!(Day::from_str("2024-13-01").is_err());
        assert!(Day::from_str("01.06.2024").is_err());
        assert!(Day::from_str("").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Day::new(2024, 6, 1).unwrap().to_string(), "2024-06-01");
        assert_eq!(Day::new(987, 12, 31).unwrap().to_string(), "0987-12-31");
    }

    #[test]
    fn next_crosses_month_and_year() {
        assert_eq!(
            Day::new(2024, 6, 30).unwrap().next(),
            Day::new(2024, 7, 1).unwrap(),
        );
        assert_eq!(
            Day::new(2024, 12, 31).unwrap().next(),
            Day::new(2025, 1, 1).unwrap(),
        );
        // 2024 is a leap year.
        assert_eq!(
            Day::new(2024, 2, 28).unwrap().next(),
            Day::new(2024, 2, 29).unwrap(),
        );
    }

    #[test]
    fn days_until() {
        let a = Day::new(2024, 6, 1).unwrap();
        let b = Day::new(2024, 6, 4).unwrap();

        assert_eq!(a.days_until(b), 3);
        assert_eq!(b.days_until(a), -3);
        assert_eq!(a.days_until(a), 0);
    }

    #[test]
    fn from_datetime_ignores_time_of_day() {
        assert_eq!(
            Day::from_datetime(datetime!(2024-06-01 23:59:59 UTC)),
            Day::new(2024, 6, 1).unwrap(),
        );
    }

    #[test]
    fn nights_between_rounds_sub_day_drift() {
        assert_eq!(
            nights_between(
                datetime!(2024-06-01 0:00 UTC),
                datetime!(2024-06-04 0:00 UTC),
            ),
            3,
        );

        // A daylight-saving style 23/25-hour day still counts as one night.
        assert_eq!(
            nights_between(
                datetime!(2024-03-30 0:00 UTC),
                datetime!(2024-03-30 23:00 UTC),
            ),
            1,
        );
        assert_eq!(
            nights_between(
                datetime!(2024-10-26 0:00 UTC),
                datetime!(2024-10-27 1:00 UTC),
            ),
            1,
        );
    }
}
