//! [`Command`] for submitting a [`BookingRequest`].

use common::operations::{Check, Insert};
use derive_more::{Display, Error};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    domain::{booking, guest, BookingRequest},
    infra::{backend, backend::OverlappingBooking, Backend},
    Service,
};

use super::Command;

/// [`Command`] for submitting a validated [`BookingRequest`] to the
/// backend.
///
/// The request is expected to have passed [`BookingRequest::build`]
/// already; the backend still re-runs the authoritative overlap check under
/// its own isolation, since the client-side one races against other guests
/// by nature.
#[derive(Clone, Debug)]
pub struct SubmitBooking {
    /// [`Session`] of the guest submitting the request.
    pub session: guest::Session,

    /// Validated [`BookingRequest`] to submit.
    pub request: BookingRequest,
}

impl<B> Command<SubmitBooking> for Service<B>
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
    type Ok = booking::Id;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitBooking { session, request } = cmd;

        let overlaps = self
            .backend()
            .execute(Check(OverlappingBooking {
                guest_id: session.guest_id,
                listing_id: request.listing_id,
                period: request.period,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if overlaps {
            return Err(tracerr::new!(E::Overlap));
        }

        self.backend()
            .execute(Insert(request))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SubmitBooking`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// [`Backend`] error.
    #[display("`Backend` operation failed: {_0}")]
    Backend(backend::Error),

    /// Requested stay overlaps an existing booking.
    #[display("requested stay overlaps an existing booking")]
    Overlap,

    /// Payment was rejected by the backend.
    #[display("payment was rejected")]
    PaymentRejected,
}

impl From<backend::Error> for ExecutionError {
    fn from(e: backend::Error) -> Self {
        match e {
            backend::Error::Overlap => Self::Overlap,
            backend::Error::PaymentRejected => Self::PaymentRejected,
            #[cfg(feature = "http")]
            e @ backend::Error::Http(_) => Self::Backend(e),
        }
    }
}
