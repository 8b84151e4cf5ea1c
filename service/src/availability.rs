//! Availability evaluation for a listing's calendar.

use std::collections::HashSet;

use common::Day;
use derive_more::{Display, Error};

use crate::domain::booking::{BookedStay, StayPeriod};

/// Set of calendar days blocked by the existing reservations of one listing.
///
/// Built once per fetch of the listing's [`BookedStay`]s and never mutated;
/// a fresh snapshot replaces it wholesale. This is a client-side guard only:
/// the backend enforces the real no-overlap invariant on submission.
#[derive(Clone, Debug, Default)]
pub struct BlockedDays(HashSet<Day>);

impl BlockedDays {
    /// Creates a new [`BlockedDays`] set from the provided [`BookedStay`]s.
    #[must_use]
    pub fn new(stays: impl IntoIterator<Item = BookedStay>) -> Self {
        Self(stays.into_iter().flat_map(BookedStay::days).collect())
    }

    /// Indicates whether the provided [`Day`] is blocked by an existing
    /// reservation.
    #[must_use]
    pub fn is_blocked(&self, day: Day) -> bool {
        self.0.contains(&day)
    }

    /// Validates that the `candidate` stay touches no blocked [`Day`].
    ///
    /// Walks the candidate's days in order, both boundaries included, and
    /// fails fast on the first blocked one.
    ///
    /// # Errors
    ///
    /// Returns a [`Conflict`] naming the first blocked [`Day`].
    pub fn validate(&self, candidate: StayPeriod) -> Result<(), Conflict> {
        for day in candidate.days() {
            if self.is_blocked(day) {
                return Err(Conflict { day });
            }
        }
        Ok(())
    }
}

/// Overlap of a candidate stay with an already booked [`Day`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`{day}` is already booked")]
pub struct Conflict {
    /// First booked [`Day`] the candidate stay touches.
    pub day: Day,
}

#[cfg(test)]
mod spec {
    use common::Day;

    use crate::domain::booking::{BookedStay, StayPeriod};

    use super::BlockedDays;

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> BookedStay {
        BookedStay {
            check_in: day(check_in),
            check_out: day(check_out),
        }
    }

    fn period(check_in: &str, check_out: &str) -> StayPeriod {
        StayPeriod::new(day(check_in), day(check_out)).unwrap()
    }

    #[test]
    fn disjoint_candidate_passes() {
        let blocked = BlockedDays::new([stay("2024-06-01", "2024-06-03")]);

        assert!(blocked.validate(period("2024-06-05", "2024-06-07")).is_ok());
    }

    #[test]
    fn contained_candidate_conflicts() {
        let blocked = BlockedDays::new([stay("2024-06-01", "2024-06-05")]);

        let conflict = blocked
            .validate(period("2024-06-03", "2024-06-04"))
            .unwrap_err();
        assert_eq!(conflict.day, day("2024-06-03"));
    }

    #[test]
    fn boundaries_are_blocked_inclusively() {
        let blocked = BlockedDays::new([stay("2024-06-01", "2024-06-03")]);

        assert!(blocked.is_blocked(day("2024-06-01")));
        assert!(blocked.is_blocked(day("2024-06-03")));
        assert!(!blocked.is_blocked(day("2024-06-04")));

        // A candidate starting on the booked check-out day still conflicts.
        assert!(blocked.validate(period("2024-06-03", "2024-06-05")).is_err());
    }

    #[test]
    fn conflict_names_first_blocked_day() {
        let blocked = BlockedDays::new([
            stay("2024-06-04", "2024-06-05"),
            stay("2024-06-08", "2024-06-09"),
        ]);

        let conflict = blocked
            .validate(period("2024-06-02", "2024-06-10"))
            .unwrap_err();
        assert_eq!(conflict.day, day("2024-06-04"));
    }

    #[test]
    fn validation_matches_day_set_intersection() {
        let booked = [stay("2024-06-01", "2024-06-03"), stay("2024-06-10", "2024-06-12")];
        let blocked = BlockedDays::new(booked);

        let candidates = [
            period("2024-05-28", "2024-05-31"),
            period("2024-06-03", "2024-06-04"),
            period("2024-06-04", "2024-06-09"),
            period("2024-06-09", "2024-06-15"),
        ];
        for candidate in candidates {
            let intersects = candidate
                .days()
                .any(|d| booked.iter().any(|s| s.days().any(|b| b == d)));
            assert_eq!(
                blocked.validate(candidate).is_err(),
                intersects,
                "candidate {candidate:?}",
            );
        }
    }

    #[test]
    fn empty_snapshot_blocks_nothing() {
        let blocked = BlockedDays::default();

        assert!(blocked.validate(period("2024-06-01", "2024-06-30")).is_ok());
    }
}
