//! Reservation confirmation workflow.

use common::{
    operations::{By, Check, Insert, Select},
    Day,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    availability::{BlockedDays, Conflict},
    command::{submit_booking, SubmitBooking},
    domain::{
        booking::{
            self, BookedStay, BookingRequest, PaymentMethod, StayPeriod,
            ValidationError,
        },
        guest, listing, Listing,
    },
    infra::{backend, backend::OverlappingBooking, Backend},
    pricing::PriceBreakdown,
    query, Service,
};

/// Multi-step reservation confirmation for a single [`Listing`] view.
///
/// Coordinates date selection, overlap re-validation, payment selection and
/// submission. Single-threaded by construction: every transition takes
/// `&mut self`, so a submission can never race a dismissal, and the
/// "reserve" affordance is naturally disabled while a submission borrows
/// the workflow. Double-submit protection beyond that is the backend's job.
#[derive(Debug)]
pub struct Reservation<B> {
    /// [`Service`] executing commands and queries of this workflow.
    service: Service<B>,

    /// [`Session`] of the guest, if one is active.
    ///
    /// [`Session`]: guest::Session
    session: Option<guest::Session>,

    /// [`Listing`] being reserved.
    listing: Listing,

    /// Latest [`BlockedDays`] snapshot of the [`Listing`]'s calendar.
    blocked: BlockedDays,

    /// Current [`State`] of this workflow.
    state: State,
}

/// State of a [`Reservation`] workflow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// No candidate stay picked yet.
    Idle,

    /// Candidate stay picked and priced.
    DatesSelected {
        /// Picked [`StayPeriod`].
        period: StayPeriod,

        /// [`PriceBreakdown`] of the picked stay.
        breakdown: PriceBreakdown,
    },

    /// Confirmation step is open: the stay re-validated against a fresh
    /// snapshot, awaiting payment details.
    ConfirmationOpen {
        /// Picked [`StayPeriod`].
        period: StayPeriod,

        /// [`PriceBreakdown`] of the picked stay.
        breakdown: PriceBreakdown,

        /// Outcome of the last failed submission, if any.
        last_failure: Option<Failure>,
    },

    /// Submission is in flight.
    Submitting {
        /// [`StayPeriod`] being submitted.
        period: StayPeriod,

        /// [`PriceBreakdown`] of the stay being submitted.
        breakdown: PriceBreakdown,
    },

    /// Booking confirmed by the backend.
    Succeeded(booking::Id),
}

/// Reason of a failed submission.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum Failure {
    /// Backend detected an overlapping booking.
    #[display("stay overlaps an existing booking")]
    Overlap,

    /// Backend rejected the payment.
    #[display("payment was rejected")]
    PaymentRejected,

    /// Submission failed for an opaque reason.
    #[display("submission failed")]
    Unknown,
}

impl From<&submit_booking::ExecutionError> for Failure {
    fn from(e: &submit_booking::ExecutionError) -> Self {
        use submit_booking::ExecutionError as E;

        match e {
            E::Overlap => Self::Overlap,
            E::PaymentRejected => Self::PaymentRejected,
            E::Backend(_) => Self::Unknown,
        }
    }
}

impl<B> Reservation<B> {
    /// Creates a new [`Reservation`] workflow over the provided [`Listing`]
    /// and its fetched [`BookedStay`]s.
    pub fn new(
        service: Service<B>,
        session: Option<guest::Session>,
        listing: Listing,
        booked: impl IntoIterator<Item = BookedStay>,
    ) -> Self {
        Self {
            service,
            session,
            listing,
            blocked: BlockedDays::new(booked),
            state: State::Idle,
        }
    }

    /// Returns the current [`State`] of this workflow.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the [`Listing`] this workflow reserves.
    #[must_use]
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Picks a candidate stay and prices it.
    ///
    /// A same-day selection is corrected to a one-night stay. May be called
    /// from any state to start over.
    ///
    /// # Errors
    ///
    /// If the check-out precedes the check-in.
    pub fn select_dates(
        &mut self,
        check_in: Day,
        check_out: Day,
    ) -> Result<PriceBreakdown, BackwardsRange> {
        let period =
            StayPeriod::new(check_in, check_out).ok_or(BackwardsRange)?;
        let breakdown = PriceBreakdown::compute(
            self.listing.nightly_rate,
            period,
            self.service.config().service_fee,
        );
        self.state = State::DatesSelected { period, breakdown };
        Ok(breakdown)
    }

    /// Opens the confirmation step for the picked stay.
    ///
    /// Re-fetches the listing's [`BookedStay`]s first: blocked days may
    /// have changed since the listing was loaded, and no freshness beyond
    /// "as of this fetch" is guaranteed.
    ///
    /// # Errors
    ///
    /// - If no candidate stay is picked yet.
    /// - If the fresh snapshot blocks the picked stay (the state is kept,
    ///   so the user may adjust the dates).
    /// - If the snapshot could not be fetched.
    pub async fn open_confirmation(&mut self) -> Result<(), OpenError>
    where
        B: Backend<
            Select<By<Vec<BookedStay>, listing::Id>>,
            Ok = Vec<BookedStay>,
            Err = Traced<backend::Error>,
        >,
    {
        use OpenError as E;

        let (period, breakdown) = match &self.state {
            State::DatesSelected { period, breakdown }
            | State::ConfirmationOpen {
                period, breakdown, ..
            } => (*period, *breakdown),
            State::Idle
            | State::Submitting { .. }
            | State::Succeeded(_) => return Err(E::NoDatesSelected),
        };

        let booked = self
            .service
            .execute(query::booked_stays::ForListing::by(self.listing.id))
            .await
            .map_err(E::Backend)?;
        self.blocked = BlockedDays::new(booked);

        self.blocked.validate(period).map_err(E::DateConflict)?;

        self.state = State::ConfirmationOpen {
            period,
            breakdown,
            last_failure: None,
        };
        Ok(())
    }

    /// Submits the reservation with the provided payment details.
    ///
    /// Validation failures are resolved locally: the confirmation step
    /// stays open and the backend is not contacted. A failed submission
    /// also returns to the open confirmation step, with the [`Failure`]
    /// recorded, so the user may retry with different dates or payment
    /// details: nothing here is terminal, and no retry happens on its own.
    ///
    /// # Errors
    ///
    /// - If the confirmation step is not open.
    /// - If the request fails validation.
    /// - If the backend fails or rejects the submission.
    pub async fn submit(
        &mut self,
        method: PaymentMethod,
        wallet: Option<&str>,
    ) -> Result<booking::Id, SubmitError>
    where
        B: Backend<
                Check<OverlappingBooking>,
                Ok = bool,
                Err = Traced<backend::Error>,
            > + Backend<
                Insert<BookingRequest>,
                Ok = booking::Id,
                Err = Traced<backend::Error>,
            >,
    {
        use SubmitError as E;

        let (period, breakdown) = match &self.state {
            State::ConfirmationOpen {
                period, breakdown, ..
            } => (*period, *breakdown),
            State::Idle
            | State::DatesSelected { .. }
            | State::Submitting { .. }
            | State::Succeeded(_) => return Err(E::NotConfirming),
        };

        let request = BookingRequest::build(
            self.session.as_ref(),
            self.listing.id,
            period,
            &self.blocked,
            &breakdown,
            method,
            wallet,
        )
        .map_err(E::Validation)?;
        // `build` has verified the session presence.
        let session =
            self.session.clone().expect("session checked by `build`");

        self.state = State::Submitting { period, breakdown };
        match self.service.execute(SubmitBooking { session, request }).await
        {
            Ok(id) => {
                self.state = State::Succeeded(id);
                Ok(id)
            }
            Err(e) => {
                let failure = Failure::from(e.as_ref());
                log::warn!("booking submission failed: {e}");
                self.state = State::ConfirmationOpen {
                    period,
                    breakdown,
                    last_failure: Some(failure),
                };
                Err(E::Failed(failure))
            }
        }
    }

    /// Dismisses the confirmation UI, returning to [`State::Idle`].
    ///
    /// Pure state reset with no side effects: an in-flight submission
    /// cannot be cancelled by this (none can be in flight while `&mut self`
    /// is available), and a booking already confirmed stays confirmed.
    pub fn dismiss(&mut self) {
        self.state = State::Idle;
    }
}

/// Error of picking a stay whose check-out precedes its check-in.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("check-out precedes check-in")]
pub struct BackwardsRange;

/// Error of opening the confirmation step of a [`Reservation`].
#[derive(Debug, Display, Error, From)]
pub enum OpenError {
    /// No candidate stay is picked yet.
    #[display("no dates selected")]
    #[from(ignore)]
    NoDatesSelected,

    /// Picked stay overlaps an already booked day.
    #[display("{_0}")]
    DateConflict(Conflict),

    /// Failed to refresh the listing's booked stays.
    #[display("failed to refresh booked stays: {_0}")]
    Backend(Traced<backend::Error>),
}

/// Error of submitting a [`Reservation`].
#[derive(Debug, Display, Error, From)]
pub enum SubmitError {
    /// Confirmation step is not open.
    #[display("confirmation step is not open")]
    #[from(ignore)]
    NotConfirming,

    /// Request failed validation and was not submitted.
    #[display("{_0}")]
    Validation(ValidationError),

    /// Submission reached the backend and failed.
    #[display("{_0}")]
    Failed(Failure),
}

#[cfg(test)]
mod spec {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use common::{
        operations::{By, Check, Insert, Select},
        Day,
    };
    use futures::executor::block_on;
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{
            booking::{
                self, BookedStay, BookingRequest, PaymentMethod,
                ValidationError,
            },
            guest,
            listing::{HostId, Listing, Title},
            Session,
        },
        infra::{backend, backend::OverlappingBooking, Backend},
        Config, Service,
    };

    use super::{Failure, Reservation, State, SubmitError};

    #[derive(Clone, Default)]
    struct Fake(Rc<FakeState>);

    #[derive(Default)]
    struct FakeState {
        booked: RefCell<Vec<BookedStay>>,
        overlap_on_check: Cell<bool>,
        insert_error: RefCell<Option<backend::Error>>,
        inserted: RefCell<Vec<BookingRequest>>,
    }

    impl Backend<Select<By<Vec<BookedStay>, crate::domain::listing::Id>>>
        for Fake
    {
        type Ok = Vec<BookedStay>;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            _: Select<By<Vec<BookedStay>, crate::domain::listing::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.0.booked.borrow().clone())
        }
    }

    impl Backend<Check<OverlappingBooking>> for Fake {
        type Ok = bool;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            _: Check<OverlappingBooking>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.0.overlap_on_check.get())
        }
    }

    impl Backend<Insert<BookingRequest>> for Fake {
        type Ok = booking::Id;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            Insert(request): Insert<BookingRequest>,
        ) -> Result<Self::Ok, Self::Err> {
            if let Some(e) = self.0.insert_error.borrow_mut().take() {
                return Err(tracerr::new!(e));
            }
            self.0.inserted.borrow_mut().push(request);
            Ok(booking::Id::from(Uuid::new_v4()))
        }
    }

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn stay(check_in: &str, check_out: &str) -> BookedStay {
        BookedStay {
            check_in: day(check_in),
            check_out: day(check_out),
        }
    }

    fn listing() -> Listing {
        Listing {
            id: crate::domain::listing::Id::new(),
            title: Title::new("Seaview apartment in Clifton").unwrap(),
            city: "Karachi".to_owned().into(),
            nightly_rate: "100PKR".parse().unwrap(),
            rating: None,
            host_id: HostId::from(Uuid::new_v4()),
            image_urls: Vec::new(),
        }
    }

    fn session() -> Session {
        Session {
            guest_id: guest::Id::new(),
            access_token: guest::Token::new("test-token"),
        }
    }

    fn reservation(
        fake: &Fake,
        session: Option<Session>,
        booked: Vec<BookedStay>,
    ) -> Reservation<Fake> {
        let service = Service::new(
            Config {
                service_fee: "5".parse().unwrap(),
            },
            fake.clone(),
        );
        Reservation::new(service, session, listing(), booked)
    }

    #[test]
    fn happy_path_reaches_succeeded() {
        let fake = Fake::default();
        let mut flow = reservation(
            &fake,
            Some(session()),
            vec![stay("2024-06-01", "2024-06-03")],
        );

        let breakdown = flow
            .select_dates(day("2024-06-05"), day("2024-06-07"))
            .unwrap();
        assert_eq!(breakdown.total, "210PKR".parse().unwrap());

        block_on(flow.open_confirmation()).unwrap();
        let id = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap();

        assert_eq!(*flow.state(), State::Succeeded(id));
        let inserted = fake.0.inserted.borrow();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].total, "210PKR".parse().unwrap());
        assert_eq!(inserted[0].wallet, None);
    }

    #[test]
    fn confirmation_revalidates_against_fresh_snapshot() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-02"))
            .unwrap();

        // Another guest books the same days between listing load and
        // confirmation.
        fake.0
            .booked
            .borrow_mut()
            .push(stay("2024-06-01", "2024-06-03"));

        let err = block_on(flow.open_confirmation()).unwrap_err();
        assert!(matches!(err, super::OpenError::DateConflict(_)));
        assert!(matches!(flow.state(), State::DatesSelected { .. }));
    }

    #[test]
    fn invalid_wallet_number_keeps_confirmation_open() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();

        let err =
            block_on(flow.submit(PaymentMethod::JazzCash, Some("123")))
                .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::InvalidPaymentNumber),
        ));
        assert!(matches!(flow.state(), State::ConfirmationOpen { .. }));
        assert!(fake.0.inserted.borrow().is_empty());

        // Corrected number goes through.
        let id = block_on(
            flow.submit(PaymentMethod::JazzCash, Some("03001234567")),
        )
        .unwrap();
        assert_eq!(*flow.state(), State::Succeeded(id));
    }

    #[test]
    fn missing_wallet_number_is_required_for_wallet_methods() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();

        let err = block_on(flow.submit(PaymentMethod::EasyPaisa, None))
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::MissingPaymentNumber),
        ));
    }

    #[test]
    fn server_detected_overlap_allows_retry_with_new_dates() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();

        // The authoritative check races: the backend rejects even though
        // the client-side pre-check passed.
        *fake.0.insert_error.borrow_mut() = Some(backend::Error::Overlap);

        let err = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Failed(Failure::Overlap)));
        assert!(matches!(
            flow.state(),
            State::ConfirmationOpen {
                last_failure: Some(Failure::Overlap),
                ..
            },
        ));

        // Second attempt with adjusted dates reaches `Succeeded`.
        _ = flow
            .select_dates(day("2024-06-10"), day("2024-06-12"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();
        let id = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap();
        assert_eq!(*flow.state(), State::Succeeded(id));
    }

    #[test]
    fn precheck_overlap_fails_submission_without_insert() {
        let fake = Fake::default();
        fake.0.overlap_on_check.set(true);
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();

        let err = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Failed(Failure::Overlap)));
        assert!(fake.0.inserted.borrow().is_empty());
    }

    #[test]
    fn unauthenticated_guest_cannot_submit() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, None, Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();

        let err = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::Unauthenticated),
        ));
    }

    #[test]
    fn submit_requires_open_confirmation() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        let err = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap_err();
        assert!(matches!(err, SubmitError::NotConfirming));
    }

    #[test]
    fn dismiss_returns_to_idle() {
        let fake = Fake::default();
        let mut flow = reservation(&fake, Some(session()), Vec::new());

        _ = flow
            .select_dates(day("2024-06-01"), day("2024-06-03"))
            .unwrap();
        block_on(flow.open_confirmation()).unwrap();
        _ = block_on(flow.submit(PaymentMethod::PayOnArrival, None))
            .unwrap();

        flow.dismiss();
        assert_eq!(*flow.state(), State::Idle);
    }
}
