//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use common::Day;
use service::domain::{booking::PaymentMethod, listing};

/// Command line client of the stays booking service.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Action performed by the client.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows a listing along with its booked stays.
    Listing {
        /// ID of the listing.
        id: listing::Id,
    },

    /// Prices a stay at a listing without booking it.
    Quote {
        /// ID of the listing.
        id: listing::Id,

        /// Check-in date (`YYYY-MM-DD`).
        #[arg(long)]
        check_in: Day,

        /// Check-out date (`YYYY-MM-DD`).
        #[arg(long)]
        check_out: Day,
    },

    /// Books a stay at a listing.
    ///
    /// Requires an active session in the configuration.
    Reserve {
        /// ID of the listing.
        id: listing::Id,

        /// Check-in date (`YYYY-MM-DD`).
        #[arg(long)]
        check_in: Day,

        /// Check-out date (`YYYY-MM-DD`).
        #[arg(long)]
        check_out: Day,

        /// Payment method to pay with.
        #[arg(long, default_value = "PAY_ON_ARRIVAL")]
        method: PaymentMethod,

        /// Mobile wallet number, for wallet payment methods.
        #[arg(long)]
        wallet: Option<String>,
    },

    /// Toggles a listing's presence on the guest's wishlist.
    ///
    /// Requires an active session in the configuration.
    Wishlist {
        /// ID of the listing.
        id: listing::Id,
    },
}
