//! One-shot CLI commands over the catalog: `recommend`, `filter` and `rank`.
//!
//! Each command builds a throwaway profile from the command-line criteria
//! and ratings, runs one core operation and prints a human-readable report.

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use staymatch_core::filter::{filter_by_with, FilterCriteria};
use staymatch_core::models::{Catalog, ProfileUpdate, UserProfile};
use staymatch_core::recommend::{Recommender, Strategy};

use crate::catalog::load_catalog;
use crate::config::Config;
use crate::display::{criteria_summary, format_number, listing_url};

/// Deterministic when seeded, OS entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub fn build_recommender(config: &Config, catalog: Arc<Catalog>) -> Recommender {
    Recommender::with_policy(catalog, config.recommend.filter_policy())
}

/// Profile of an anonymous CLI user.
fn cli_profile(update: &ProfileUpdate) -> Result<UserProfile> {
    let mut profile = UserProfile::new(0);
    profile.apply(update)?;
    Ok(profile)
}

pub async fn run_recommend(config: &Config, update: ProfileUpdate, seed: Option<u64>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let recommender = build_recommender(config, catalog);
    let profile = cli_profile(&update)?;
    let mut rng = make_rng(seed.or(config.recommend.seed));

    let rec = recommender.recommend(&profile, &mut rng)?;
    let listing = recommender.catalog().get(rec.listing_id);
    let name = listing
        .and_then(|l| l.name.as_deref())
        .unwrap_or("(unnamed)");

    println!("Room {}: {}", rec.listing_id, name);
    println!("    url: {}", listing_url(rec.listing_id));
    if let Some(listing) = listing {
        println!("    price: {}", format_number(listing.price));
        println!("    rating: {}", format_number(listing.rating));
        if let Some(image) = listing.images.first() {
            println!("    image: {}", image);
        }
    }
    match (rec.strategy, rec.score) {
        (Strategy::Similarity, Some(score)) => println!("    chosen by: similarity ({:.3})", score),
        _ => println!("    chosen by: random pick"),
    }
    if !rec.respects_criteria {
        println!("    note: no listing matches all criteria, picked from the whole catalog");
    }
    println!();
    println!("{}", criteria_summary(&profile));
    Ok(())
}

pub async fn run_filter(config: &Config, update: ProfileUpdate, limit: Option<usize>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let profile = cli_profile(&update)?;
    let criteria = FilterCriteria::from_profile(&profile);
    let policy = config.recommend.filter_policy();

    let matches = filter_by_with(catalog.schema(), catalog.listings(), &criteria, &policy);
    if matches.is_empty() {
        println!("No matching listings.");
        return Ok(());
    }

    let total = matches.len();
    for listing in matches.iter().take(limit.unwrap_or(total)) {
        println!(
            "{}  {:>8}  {:>4}  {}",
            listing.id,
            format_number(listing.price),
            format_number(listing.rating),
            listing.name.as_deref().unwrap_or("(unnamed)")
        );
    }
    println!();
    println!("{} of {} listings match.", total, catalog.len());
    Ok(())
}

pub async fn run_rank(config: &Config, update: ProfileUpdate, limit: Option<usize>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let recommender = build_recommender(config, catalog);
    let profile = cli_profile(&update)?;
    if profile.ratings.is_empty() {
        anyhow::bail!("rank needs at least one --rated ID=SCORE");
    }

    let n = limit.unwrap_or(config.recommend.shortlist);
    let ranked = recommender.shortlist(&profile, n)?;
    if ranked.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, (listing_id, score)) in ranked.iter().enumerate() {
        let name = recommender
            .catalog()
            .get(*listing_id)
            .and_then(|l| l.name.as_deref())
            .unwrap_or("(unnamed)");
        println!("{}. [{:.3}] Room {}: {}", i + 1, score, listing_id, name);
        println!("    url: {}", listing_url(*listing_id));
    }
    Ok(())
}
