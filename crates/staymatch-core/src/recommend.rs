//! Recommendation orchestration.
//!
//! [`Recommender::recommend`] composes filtering, preference aggregation and
//! similarity ranking into a single request/response call over the current
//! catalog and a profile snapshot. It never mutates either.
//!
//! # Fallback Policy
//!
//! 1. Build the preference vector from the profile's ratings.
//! 2. Filter the catalog by the stated criteria, excluding rated listings.
//! 3. If nothing survives, the candidates become the whole catalog and the
//!    result is flagged `respects_criteria = false`.
//! 4. With a preference vector, return the best-ranked candidate.
//! 5. Without one (or when no candidate has a defined score), draw a
//!    candidate uniformly from the injected random source.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::filter::{filter_by_with, FilterCriteria, FilterPolicy};
use crate::models::{Catalog, Listing, ListingId, UserProfile};
use crate::profile::build_preference_vector;
use crate::similarity::rank;

/// How a recommendation was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Similarity,
    Random,
}

/// The outcome of one recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub listing_id: ListingId,
    /// `false` when no listing satisfied the criteria and the whole catalog
    /// was used instead.
    pub respects_criteria: bool,
    pub strategy: Strategy,
    /// Similarity score, present for [`Strategy::Similarity`].
    pub score: Option<f64>,
}

/// Stateless recommendation engine over a shared catalog.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
    policy: FilterPolicy,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_policy(catalog, FilterPolicy::default())
    }

    pub fn with_policy(catalog: Arc<Catalog>, policy: FilterPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Candidate listings for a profile and whether they honour its criteria.
    pub fn candidates(&self, profile: &UserProfile) -> (Vec<&Listing>, bool) {
        let criteria = FilterCriteria::from_profile(profile);
        let filtered = filter_by_with(
            self.catalog.schema(),
            self.catalog.listings(),
            &criteria,
            &self.policy,
        );
        if filtered.is_empty() {
            debug!(
                user_id = profile.user_id,
                "no listing matches the criteria, falling back to the full catalog"
            );
            (self.catalog.listings().iter().collect(), false)
        } else {
            (filtered, true)
        }
    }

    /// Pick one listing for the user.
    ///
    /// Fails only when the catalog is empty.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        profile: &UserProfile,
        rng: &mut R,
    ) -> Result<Recommendation> {
        if self.catalog.is_empty() {
            bail!("catalog is empty, nothing to recommend");
        }

        let preference = build_preference_vector(&self.catalog, &profile.ratings);
        let (candidates, respects_criteria) = self.candidates(profile);

        if let Some(ref preference) = preference {
            let ranked = rank(candidates.iter().copied(), preference, 1)?;
            if let Some(&(listing_id, score)) = ranked.first() {
                debug!(
                    user_id = profile.user_id,
                    listing_id,
                    score,
                    respects_criteria,
                    "recommended by similarity"
                );
                return Ok(Recommendation {
                    listing_id,
                    respects_criteria,
                    strategy: Strategy::Similarity,
                    score: Some(score),
                });
            }
            debug!(
                user_id = profile.user_id,
                "no candidate has a defined similarity, drawing at random"
            );
        }

        let pick = candidates
            .choose(rng)
            .ok_or_else(|| anyhow!("no candidate listings available"))?;
        debug!(
            user_id = profile.user_id,
            listing_id = pick.id,
            respects_criteria,
            "recommended at random"
        );
        Ok(Recommendation {
            listing_id: pick.id,
            respects_criteria,
            strategy: Strategy::Random,
            score: None,
        })
    }

    /// The `n` best-scoring candidates for a user with rating history.
    ///
    /// Returns an empty list when the profile has no usable ratings.
    pub fn shortlist(&self, profile: &UserProfile, n: usize) -> Result<Vec<(ListingId, f64)>> {
        let Some(preference) = build_preference_vector(&self.catalog, &profile.ratings) else {
            return Ok(Vec::new());
        };
        let (candidates, _) = self.candidates(profile);
        Ok(rank(candidates, &preference, n)?)
    }
}
