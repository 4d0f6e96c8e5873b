//! Criteria filtering over the listing catalog.
//!
//! [`filter_by`] narrows a set of listings to the ones matching a user's
//! stated criteria. It is a stateless predicate pipeline: it borrows the
//! listings and returns the survivors, so the shared catalog is never
//! touched.
//!
//! # Rule Precedence
//!
//! 1. `min_price > max_price` (both given) → swap the bounds.
//! 2. `max_price` → drop `price > max_price`.
//! 3. `min_price` → drop `price < min_price`.
//! 4. `price` (only when neither bound is given) → keep `price ± tolerance`.
//! 5. `rating` → drop listings rated below it.
//! 6. `neighbourhood` → keep the matching indicator column (`"Staten"` is
//!    rewritten to `"Staten Island"` first).
//! 7. `room_type` → map to a canonical category, keep the matching column.
//! 8. `min_nights` → drop `minimum_nights < min_nights`.
//! 9. `excluded_ids` → drop listed ids.
//!
//! An empty result is a valid outcome; the orchestrator applies its
//! fallback policy to it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{CatalogSchema, Listing, ListingId, UserProfile};

/// Width of the window kept around a single stated price.
pub const DEFAULT_PRICE_TOLERANCE: f64 = 20.0;

pub const ENTIRE_HOME: &str = "Entire home/apt";
pub const HOTEL_ROOM: &str = "Hotel room";
pub const PRIVATE_ROOM: &str = "Private room";
pub const SHARED_ROOM: &str = "Shared room";

/// The four canonical room-type categories of the dataset.
pub const ROOM_TYPES: [&str; 4] = [ENTIRE_HOME, HOTEL_ROOM, PRIVATE_ROOM, SHARED_ROOM];

/// How free-text room types are resolved to a canonical category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomTypeMapping {
    /// Per-keyword mapping (`home`/`apartment` → entire home, `hotel`,
    /// `private`, `shared`). Unrecognised input applies no room filter.
    #[default]
    Keyword,
    /// Every supplied room type resolves to "Entire home/apt", matching the
    /// behaviour of the first deployed bot.
    Legacy,
}

/// Tunables that shape filtering but are not user criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterPolicy {
    pub price_tolerance: f64,
    pub room_type_mapping: RoomTypeMapping,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            price_tolerance: DEFAULT_PRICE_TOLERANCE,
            room_type_mapping: RoomTypeMapping::default(),
        }
    }
}

/// Criteria accepted by [`filter_by`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rating: Option<f64>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub min_nights: Option<u32>,
    pub excluded_ids: HashSet<ListingId>,
}

impl FilterCriteria {
    /// Criteria stated in a profile, excluding every listing it already rated.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            price: profile.price,
            min_price: profile.min_price,
            max_price: profile.max_price,
            rating: profile.rating,
            neighbourhood: profile.neighbourhood.clone(),
            room_type: profile.room_type.clone(),
            min_nights: profile.minimum_nights,
            excluded_ids: profile.ratings.keys().copied().collect(),
        }
    }
}

/// Resolve a free-text room type to one of [`ROOM_TYPES`].
pub fn canonical_room_type(room_type: &str, mapping: RoomTypeMapping) -> Option<&'static str> {
    if mapping == RoomTypeMapping::Legacy {
        return Some(ENTIRE_HOME);
    }
    let lowered = room_type.trim().to_lowercase();
    if let Some(canonical) = ROOM_TYPES
        .iter()
        .copied()
        .find(|c| c.to_lowercase() == lowered)
    {
        return Some(canonical);
    }
    match lowered.as_str() {
        "home" | "entire" | "entire home" | "apartment" | "appartment" | "apt" | "flat" => {
            Some(ENTIRE_HOME)
        }
        "hotel" => Some(HOTEL_ROOM),
        "private" => Some(PRIVATE_ROOM),
        "shared" => Some(SHARED_ROOM),
        _ => None,
    }
}

/// Rewrite dataset naming quirks in a neighbourhood name.
pub fn normalize_neighbourhood(neighbourhood: &str) -> String {
    let trimmed = neighbourhood.trim();
    if trimmed.eq_ignore_ascii_case("staten") {
        "Staten Island".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Filter listings with the default [`FilterPolicy`].
pub fn filter_by<'a, I>(
    schema: &CatalogSchema,
    listings: I,
    criteria: &FilterCriteria,
) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    filter_by_with(schema, listings, criteria, &FilterPolicy::default())
}

/// Filter listings by criteria, applying the rules in precedence order.
pub fn filter_by_with<'a, I>(
    schema: &CatalogSchema,
    listings: I,
    criteria: &FilterCriteria,
    policy: &FilterPolicy,
) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut rooms: Vec<&'a Listing> = listings.into_iter().collect();
    let total = rooms.len();

    let (mut min_price, mut max_price) = (criteria.min_price, criteria.max_price);
    if let (Some(lo), Some(hi)) = (min_price, max_price) {
        if lo > hi {
            min_price = Some(hi);
            max_price = Some(lo);
        }
    }

    if let Some(hi) = max_price {
        rooms.retain(|l| l.price <= hi);
    }
    if let Some(lo) = min_price {
        rooms.retain(|l| l.price >= lo);
    }
    if let (Some(price), None, None) = (criteria.price, min_price, max_price) {
        let tolerance = policy.price_tolerance;
        rooms.retain(|l| l.price >= price - tolerance && l.price <= price + tolerance);
    }

    if let Some(rating) = criteria.rating {
        rooms.retain(|l| l.rating >= rating);
    }

    if let Some(ref neighbourhood) = criteria.neighbourhood {
        let name = normalize_neighbourhood(neighbourhood);
        match schema.neighbourhood_column(&name) {
            Some(col) => rooms.retain(|l| l.in_neighbourhood(col)),
            None => {
                warn!(neighbourhood = %name, "unknown neighbourhood, no listing can match");
                rooms.clear();
            }
        }
    }

    if let Some(ref room_type) = criteria.room_type {
        match canonical_room_type(room_type, policy.room_type_mapping) {
            Some(category) => match schema.room_type_column(category) {
                Some(col) => rooms.retain(|l| l.has_room_type(col)),
                None => {
                    warn!(room_type = category, "room type missing from catalog schema");
                    rooms.clear();
                }
            },
            None => debug!(room_type = %room_type, "unrecognised room type, filter skipped"),
        }
    }

    if let Some(min_nights) = criteria.min_nights {
        rooms.retain(|l| l.minimum_nights >= min_nights);
    }

    if !criteria.excluded_ids.is_empty() {
        rooms.retain(|l| !criteria.excluded_ids.contains(&l.id));
    }

    debug!(total, kept = rooms.len(), "filtered listings");
    rooms
}
