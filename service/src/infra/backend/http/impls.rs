//! [`Handler`] implementations of the [`Http`] backend operations.
//!
//! [`Handler`]: common::Handler

use std::str::FromStr as _;

use common::{
    money::Currency,
    operations::{By, Check, Insert, Select, Toggle},
    Day, Money,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::{
        booking::{self, BookedStay, BookingRequest},
        guest,
        listing::{self, HostId, ImageUrl, Listing, Rating, Title},
    },
    infra::{
        backend::{
            self,
            http::{Error, Http},
            OverlappingBooking, WishlistEntry,
        },
        Backend,
    },
};

/// [`Listing`] projection row as returned by the backend.
#[derive(Debug, Deserialize)]
struct ListingRow {
    id: listing::Id,
    title: String,
    city: String,
    price_per_night: Decimal,
    currency: String,
    rating: Option<Decimal>,
    host_id: HostId,
    image_urls: Vec<String>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = Error;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: Title::new(row.title)
                .ok_or(Error::InvalidRow("title"))?,
            city: row.city.into(),
            nightly_rate: Money {
                amount: row.price_per_night,
                currency: Currency::from_str(&row.currency)
                    .map_err(|_| Error::InvalidRow("currency"))?,
            },
            rating: row
                .rating
                .map(|r| Rating::new(r).ok_or(Error::InvalidRow("rating")))
                .transpose()?,
            host_id: row.host_id,
            image_urls: row.image_urls.into_iter().map(ImageUrl::from).collect(),
        })
    }
}

impl Backend<Select<By<Option<Listing>, listing::Id>>> for Http {
    type Ok = Option<Listing>;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Args {
            p_listing_id: listing::Id,
        }

        let rows: Vec<ListingRow> = self
            .rpc(
                "get_listing_by_id",
                &Args {
                    p_listing_id: by.into_inner(),
                },
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|row| {
                Listing::try_from(row)
                    .map_err(tracerr::from_and_wrap!(=> backend::Error))
            })
            .transpose()
    }
}

/// [`BookedStay`] row as returned by the backend.
#[derive(Debug, Deserialize)]
struct BookedStayRow {
    start_date: Day,
    end_date: Day,
}

impl Backend<Select<By<Vec<BookedStay>, listing::Id>>> for Http {
    type Ok = Vec<BookedStay>;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<BookedStay>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Args {
            p_listing_id: listing::Id,
        }

        let rows: Vec<BookedStayRow> = self
            .rpc(
                "get_booked_dates",
                &Args {
                    p_listing_id: by.into_inner(),
                },
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| BookedStay {
                check_in: row.start_date,
                check_out: row.end_date,
            })
            .collect())
    }
}

impl Backend<Check<OverlappingBooking>> for Http {
    type Ok = bool;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Check(check): Check<OverlappingBooking>,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Args {
            p_guest_id: guest::Id,
            p_listing_id: listing::Id,
            p_start_date: Day,
            p_end_date: Day,
        }

        self.rpc(
            "check_booking_overlap",
            &Args {
                p_guest_id: check.guest_id,
                p_listing_id: check.listing_id,
                p_start_date: check.period.check_in(),
                p_end_date: check.period.check_out(),
            },
        )
        .await
    }
}

impl Backend<Insert<BookingRequest>> for Http {
    type Ok = booking::Id;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<BookingRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Args {
            p_guest_id: guest::Id,
            p_listing_id: listing::Id,
            p_start_date: Day,
            p_end_date: Day,
            p_total: Decimal,
            p_payment_method: String,
            p_payment_number: Option<String>,
        }

        self.rpc(
            "create_booking_with_payment",
            &Args {
                p_guest_id: request.guest_id,
                p_listing_id: request.listing_id,
                p_start_date: request.period.check_in(),
                p_end_date: request.period.check_out(),
                p_total: request.total.amount,
                p_payment_method: request.method.to_string(),
                p_payment_number: request.wallet.map(|w| w.to_string()),
            },
        )
        .await
    }
}

impl Backend<Toggle<WishlistEntry>> for Http {
    type Ok = bool;
    type Err = Traced<backend::Error>;

    async fn execute(
        &self,
        Toggle(entry): Toggle<WishlistEntry>,
    ) -> Result<Self::Ok, Self::Err> {
        #[derive(Serialize)]
        struct Args {
            p_guest_id: guest::Id,
            p_listing_id: listing::Id,
        }

        self.rpc(
            "toggle_wishlist",
            &Args {
                p_guest_id: entry.guest_id,
                p_listing_id: entry.listing_id,
            },
        )
        .await
    }
}
