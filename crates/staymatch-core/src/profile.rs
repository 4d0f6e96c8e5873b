//! Preference-vector aggregation from a user's rating history.
//!
//! # Algorithm
//!
//! 1. For each rated listing id, look up its feature row in the catalog and
//!    pair it with the user's rating (not the catalog rating). Ids missing
//!    from the catalog are skipped.
//! 2. Scale every feature of a row by `user_rating / 5`, so a 5 leaves the
//!    row unchanged and lukewarm ratings weigh less.
//! 3. The preference vector is the column-wise mean of the scaled rows.
//!
//! No collected rows means no preference vector.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{Catalog, ListingId, MAX_RATING};

/// One rated listing's feature row, carrying the user's rating.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedRow {
    pub listing_id: ListingId,
    pub rating: u8,
    pub features: Vec<f64>,
}

impl RatedRow {
    /// Scale the features by `rating / 5`.
    pub fn normalized(&self) -> Vec<f64> {
        let weight = f64::from(self.rating) / f64::from(MAX_RATING);
        self.features.iter().map(|f| f * weight).collect()
    }
}

/// Collect the feature rows of every rated listing present in the catalog.
pub fn rated_rows(catalog: &Catalog, ratings: &BTreeMap<ListingId, u8>) -> Vec<RatedRow> {
    ratings
        .iter()
        .filter_map(|(&listing_id, &rating)| match catalog.get(listing_id) {
            Some(listing) => Some(RatedRow {
                listing_id,
                rating,
                features: listing.features.clone(),
            }),
            None => {
                warn!(listing_id, "rated listing not in catalog, skipped");
                None
            }
        })
        .collect()
}

/// Build the user's preference vector, or `None` without usable ratings.
pub fn build_preference_vector(
    catalog: &Catalog,
    ratings: &BTreeMap<ListingId, u8>,
) -> Option<Vec<f64>> {
    let rows = rated_rows(catalog, ratings);
    if rows.is_empty() {
        return None;
    }

    let width = catalog.schema().features.len();
    let mut sums = vec![0.0f64; width];
    for row in &rows {
        for (sum, value) in sums.iter_mut().zip(row.normalized()) {
            *sum += value;
        }
    }

    let count = rows.len() as f64;
    let vector: Vec<f64> = sums.into_iter().map(|s| s / count).collect();
    debug!(rows = rows.len(), width, "built preference vector");
    Some(vector)
}
