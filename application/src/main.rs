use std::{io, sync::OnceLock};

use application::{args, Args, Config, Service};
use secrecy::SecretString;
use service::{
    command::ToggleWishlist,
    domain::{booking::StayPeriod, listing, Listing},
    infra::{backend::http, Http},
    pricing::PriceBreakdown,
    query,
    workflow::Reservation,
    Command as _,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_target(false)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_target(false)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config, command } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        backend,
        session,
        pricing,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let session = session.into_session();

    let http = Http::new(http::Config {
        base_url: backend.base_url,
        api_key: SecretString::from(backend.api_key),
        access_token: session
            .as_ref()
            .map(|s| s.access_token.as_ref().clone()),
        timeout: backend.timeout,
    })
    .map_err(|e| {
        log::error!("failed to initialize `Http` client: {e}");
    })?;

    let service = Service::new(pricing.into(), http);

    match command {
        args::Command::Listing { id } => {
            let listing = fetch_listing(&service, id).await?;
            let booked = fetch_booked_stays(&service, id).await?;

            println!("{}", listing.title);
            println!("  id:     {}", listing.id);
            println!("  city:   {}", listing.city);
            println!("  rate:   {} / night", listing.nightly_rate);
            if let Some(rating) = listing.rating {
                println!("  rating: {rating}");
            }
            for stay in booked {
                println!("  booked: {} .. {}", stay.check_in, stay.check_out);
            }
        }

        args::Command::Quote {
            id,
            check_in,
            check_out,
        } => {
            let listing = fetch_listing(&service, id).await?;
            let period =
                StayPeriod::new(check_in, check_out).ok_or_else(|| {
                    log::error!(
                        "check-out `{check_out}` precedes check-in \
                         `{check_in}`",
                    );
                })?;

            let breakdown = PriceBreakdown::compute(
                listing.nightly_rate,
                period,
                service.config().service_fee,
            );
            println!("{} nights at {}", breakdown.nights, listing.title);
            println!("  subtotal: {}", breakdown.subtotal);
            println!(
                "  fee:      {} ({}%)",
                breakdown.service_fee, breakdown.service_fee_rate,
            );
            println!("  total:    {}", breakdown.total);
        }

        args::Command::Reserve {
            id,
            check_in,
            check_out,
            method,
            wallet,
        } => {
            let listing = fetch_listing(&service, id).await?;
            let booked = fetch_booked_stays(&service, id).await?;

            let mut reservation =
                Reservation::new(service, session, listing, booked);

            let breakdown = reservation
                .select_dates(check_in, check_out)
                .map_err(|e| log::error!("cannot select dates: {e}"))?;
            log::info!(
                "{} nights priced at {}",
                breakdown.nights,
                breakdown.total,
            );

            reservation.open_confirmation().await.map_err(|e| {
                log::error!("cannot open confirmation: {e}");
            })?;

            let booking_id = reservation
                .submit(method, wallet.as_deref())
                .await
                .map_err(|e| log::error!("booking failed: {e}"))?;
            println!("booked: {booking_id}");
        }

        args::Command::Wishlist { id } => {
            let added = service
                .execute(ToggleWishlist {
                    session,
                    listing_id: id,
                })
                .await
                .map_err(|e| {
                    log::error!("failed to toggle wishlist: {e}");
                })?;
            if added {
                println!("added to wishlist");
            } else {
                println!("removed from wishlist");
            }
        }
    }

    Ok(())
}

async fn fetch_listing(
    service: &Service,
    id: listing::Id,
) -> Result<Listing, ()> {
    service
        .execute(query::listing::ById::by(id))
        .await
        .map_err(|e| log::error!("failed to fetch listing `{id}`: {e}"))?
        .ok_or_else(|| log::error!("listing `{id}` not found"))
}

async fn fetch_booked_stays(
    service: &Service,
    id: listing::Id,
) -> Result<Vec<service::domain::booking::BookedStay>, ()> {
    service
        .execute(query::booked_stays::ForListing::by(id))
        .await
        .map_err(|e| {
            log::error!("failed to fetch booked stays of `{id}`: {e}");
        })
}
