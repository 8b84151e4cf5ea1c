//! [`Command`] for toggling a listing's wishlist membership.

use common::operations::Toggle;
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    domain::{guest, listing},
    infra::{backend, backend::WishlistEntry, Backend},
    Service,
};

use super::Command;

/// [`Command`] for toggling a listing's membership in the guest's wishlist.
#[derive(Clone, Debug)]
pub struct ToggleWishlist {
    /// [`Session`] of the guest, if one is active.
    pub session: Option<guest::Session>,

    /// ID of the listing to (un)wishlist.
    pub listing_id: listing::Id,
}

impl<B> Command<ToggleWishlist> for Service<B>
where
    B: Backend<Toggle<WishlistEntry>, Ok = bool, Err = Traced<backend::Error>>,
{
    /// New membership state: `true` if the listing is now wishlisted.
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleWishlist,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleWishlist {
            session,
            listing_id,
        } = cmd;

        let session = session
            .ok_or(E::Unauthenticated)
            .map_err(tracerr::wrap!())?;

        self.backend()
            .execute(Toggle(WishlistEntry {
                guest_id: session.guest_id,
                listing_id,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ToggleWishlist`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Backend`] error.
    #[display("`Backend` operation failed: {_0}")]
    Backend(backend::Error),

    /// No guest session is active.
    #[display("no active guest session")]
    Unauthenticated,
}

#[cfg(test)]
mod spec {
    use std::cell::Cell;

    use common::{operations::Toggle, Handler, Percent};
    use futures::executor::block_on;
    use rust_decimal::Decimal;
    use tracerr::Traced;

    use crate::{
        domain::{guest, listing},
        infra::{backend, backend::WishlistEntry},
        Config, Service,
    };

    use super::{ExecutionError, ToggleWishlist};

    #[derive(Default)]
    struct Fake {
        wishlisted: Cell<bool>,
    }

    impl Handler<Toggle<WishlistEntry>> for Fake {
        type Ok = bool;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            _: Toggle<WishlistEntry>,
        ) -> Result<Self::Ok, Self::Err> {
            self.wishlisted.set(!self.wishlisted.get());
            Ok(self.wishlisted.get())
        }
    }

    fn service() -> Service<Fake> {
        Service::new(
            Config {
                service_fee: Percent::new(Decimal::from(5)).unwrap(),
            },
            Fake::default(),
        )
    }

    #[test]
    fn flips_membership_and_reports_new_state() {
        let service = service();
        let session = guest::Session {
            guest_id: guest::Id::new(),
            access_token: guest::Token::new("test-token"),
        };
        let cmd = ToggleWishlist {
            session: Some(session),
            listing_id: listing::Id::new(),
        };

        assert!(block_on(service.execute(cmd.clone())).unwrap());
        assert!(!block_on(service.execute(cmd)).unwrap());
    }

    #[test]
    fn requires_an_active_session() {
        let service = service();

        let err = block_on(service.execute(ToggleWishlist {
            session: None,
            listing_id: listing::Id::new(),
        }))
        .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Unauthenticated));
    }
}
