//! # StayMatch CLI (`staymatch`)
//!
//! ## Usage
//!
//! ```bash
//! staymatch --config ./config/staymatch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `staymatch recommend` | Recommend one listing for the given criteria and ratings |
//! | `staymatch filter` | List the listings matching the given criteria |
//! | `staymatch rank` | Top listings by similarity to the given ratings |
//! | `staymatch session` | Replay JSON-lines chat events and print JSON replies |
//!
//! ## Examples
//!
//! ```bash
//! # Cheapest-first browsing in a neighbourhood
//! staymatch filter --neighbourhood manhattan --max-price 150
//!
//! # One recommendation, reproducible
//! staymatch recommend --room-type private --rated 2539=5 --seed 7
//!
//! # Without a config file
//! staymatch --catalog data/listings.json rank --rated 2539=4
//! ```

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use staymatch::config::{self, Config};
use staymatch::{logging, recommend, session};
use staymatch_core::models::{ListingId, ProfileUpdate};
use std::path::PathBuf;

/// StayMatch: short-term-rental recommendations from criteria and ratings.
#[derive(Parser)]
#[command(name = "staymatch", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/staymatch.toml`. May be absent when
    /// `--catalog` is given.
    #[arg(long, global = true, default_value = "./config/staymatch.toml")]
    config: PathBuf,

    /// Catalog JSON file, overriding `[catalog].path`.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend one listing.
    ///
    /// Listings already rated are never recommended again. When nothing
    /// matches the criteria the whole catalog is used and a note is printed.
    Recommend {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Seed for the random pick used without rating history.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List listings matching the criteria.
    Filter {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Maximum number of listings to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rank candidates by similarity to the rated listings.
    Rank {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Number of results. Defaults to `[recommend].shortlist`.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Replay chat events from JSON lines.
    ///
    /// Each input line is one event (`criteria`, `rate`, `saved`, `name`,
    /// `greeting`, `help`); each output line is the JSON reply.
    Session {
        /// Event file. Reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Search criteria shared by the one-shot commands.
#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    /// Lower price bound.
    #[arg(long)]
    min_price: Option<f64>,

    /// Upper price bound.
    #[arg(long)]
    max_price: Option<f64>,

    /// Target price, matched within `[recommend].price_tolerance` when no
    /// bound is given.
    #[arg(long)]
    price: Option<f64>,

    #[arg(long)]
    neighbourhood: Option<String>,

    /// Room type keyword (`home`, `private`, `shared`, `hotel`) or full name.
    #[arg(long)]
    room_type: Option<String>,

    /// Nights the guest intends to stay.
    #[arg(long)]
    min_nights: Option<u32>,

    /// Minimum catalog rating.
    #[arg(long)]
    min_rating: Option<f64>,

    /// A previous rating, as `LISTING_ID=SCORE` (0-5). Repeatable.
    #[arg(long = "rated", value_parser = parse_rating)]
    rated: Vec<(ListingId, u8)>,
}

impl CriteriaArgs {
    fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            min_price: self.min_price,
            max_price: self.max_price,
            price: self.price,
            neighbourhood: self.neighbourhood,
            room_type: self.room_type,
            minimum_nights: self.min_nights,
            rating: self.min_rating,
            ratings: self.rated.into_iter().collect(),
            ..ProfileUpdate::default()
        }
    }
}

/// Parse a `LISTING_ID=SCORE` pair for `--rated` arguments.
fn parse_rating(s: &str) -> Result<(ListingId, u8), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid LISTING_ID=SCORE: no '=' found in '{}'", s))?;
    let id = s[..pos]
        .trim()
        .parse()
        .map_err(|e| format!("invalid listing id in '{}': {}", s, e))?;
    let score: u8 = s[pos + 1..]
        .trim()
        .parse()
        .map_err(|e| format!("invalid score in '{}': {}", s, e))?;
    if score > 5 {
        return Err(format!("score must be 0-5, got {}", score));
    }
    Ok((id, score))
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    match (&cli.catalog, cli.config.exists()) {
        (Some(catalog), true) => {
            let mut cfg = config::load_config(&cli.config)?;
            cfg.catalog.path = catalog.clone();
            Ok(cfg)
        }
        (Some(catalog), false) => Ok(Config::with_catalog(catalog.clone())),
        (None, true) => config::load_config(&cli.config),
        (None, false) => bail!(
            "Config file not found: {} (pass --config or --catalog)",
            cli.config.display()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    logging::init(&cfg.logging)?;

    match cli.command {
        Commands::Recommend { criteria, seed } => {
            recommend::run_recommend(&cfg, criteria.into_update(), seed).await?;
        }
        Commands::Filter { criteria, limit } => {
            recommend::run_filter(&cfg, criteria.into_update(), limit).await?;
        }
        Commands::Rank { criteria, limit } => {
            recommend::run_rank(&cfg, criteria.into_update(), limit).await?;
        }
        Commands::Session { input, seed } => {
            session::run_session(&cfg, input, seed).await?;
        }
    }

    Ok(())
}
