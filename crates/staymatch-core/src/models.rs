//! Core data models used throughout StayMatch.
//!
//! These types represent the listing catalog produced by the ETL step and the
//! per-user profile that accumulates stated criteria and ratings across a
//! conversation.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog-wide listing identifier (the rental platform's room id).
pub type ListingId = i64;

/// Chat user identifier.
pub type UserId = u64;

/// Highest rating a user can give a listing.
pub const MAX_RATING: u8 = 5;

/// Column layout of the catalog table.
///
/// Listings carry one value per column of each block, in the same order:
/// a one-hot neighbourhood block, a one-hot room-type block, and the
/// trailing feature block used as the similarity vector space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSchema {
    pub neighbourhoods: Vec<String>,
    pub room_types: Vec<String>,
    pub features: Vec<String>,
}

impl CatalogSchema {
    /// Index of the neighbourhood indicator column, matched case-insensitively.
    pub fn neighbourhood_column(&self, name: &str) -> Option<usize> {
        column_index(&self.neighbourhoods, name)
    }

    /// Index of the room-type indicator column, matched case-insensitively.
    pub fn room_type_column(&self, name: &str) -> Option<usize> {
        column_index(&self.room_types, name)
    }
}

fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.eq_ignore_ascii_case(name.trim()))
}

/// A single rental listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub name: Option<String>,
    pub price: f64,
    /// Catalog rating in `[0, 5]`.
    #[serde(default)]
    pub rating: f64,
    pub minimum_nights: u32,
    pub neighbourhoods: Vec<f64>,
    pub room_types: Vec<f64>,
    pub features: Vec<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Listing {
    /// The feature block used for similarity scoring.
    pub fn feature_vector(&self) -> &[f64] {
        &self.features
    }

    pub fn in_neighbourhood(&self, column: usize) -> bool {
        self.neighbourhoods.get(column).is_some_and(|v| *v != 0.0)
    }

    pub fn has_room_type(&self, column: usize) -> bool {
        self.room_types.get(column).is_some_and(|v| *v != 0.0)
    }
}

/// The immutable listing table.
///
/// Built once from the ETL output and shared read-only (typically behind an
/// `Arc`) by every request for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    schema: CatalogSchema,
    listings: Vec<Listing>,
    by_id: HashMap<ListingId, usize>,
}

impl Catalog {
    /// Validate rows against the schema and index them by id.
    ///
    /// Every row must carry exactly one value per schema column and ids must
    /// be unique.
    pub fn new(schema: CatalogSchema, listings: Vec<Listing>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(listings.len());
        for (idx, listing) in listings.iter().enumerate() {
            if listing.neighbourhoods.len() != schema.neighbourhoods.len() {
                bail!(
                    "listing {} has {} neighbourhood columns, schema defines {}",
                    listing.id,
                    listing.neighbourhoods.len(),
                    schema.neighbourhoods.len()
                );
            }
            if listing.room_types.len() != schema.room_types.len() {
                bail!(
                    "listing {} has {} room type columns, schema defines {}",
                    listing.id,
                    listing.room_types.len(),
                    schema.room_types.len()
                );
            }
            if listing.features.len() != schema.features.len() {
                bail!(
                    "listing {} has {} feature columns, schema defines {}",
                    listing.id,
                    listing.features.len(),
                    schema.features.len()
                );
            }
            if by_id.insert(listing.id, idx).is_some() {
                bail!("duplicate listing id {}", listing.id);
            }
        }
        Ok(Self {
            schema,
            listings,
            by_id,
        })
    }

    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        self.by_id.get(&id).map(|&idx| &self.listings[idx])
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Accumulated state of one user: stated criteria plus rating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price: Option<f64>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub minimum_nights: Option<u32>,
    /// Minimum acceptable catalog rating.
    pub rating: Option<f64>,
    /// Listing id → the user's rating (0-5), one entry per listing.
    pub ratings: BTreeMap<ListingId, u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            name: None,
            min_price: None,
            max_price: None,
            price: None,
            neighbourhood: None,
            room_type: None,
            minimum_nights: None,
            rating: None,
            ratings: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update into the profile.
    ///
    /// Supplied fields overwrite stored ones. A bound given without its
    /// counterpart clears the counterpart, and once ratings exist an update
    /// without `price` clears the stored mean price.
    pub fn apply(&mut self, update: &ProfileUpdate) -> Result<()> {
        for (&listing_id, &rating) in &update.ratings {
            check_rating(listing_id, rating)?;
        }

        overwrite(&mut self.name, &update.name);
        overwrite(&mut self.min_price, &update.min_price);
        overwrite(&mut self.max_price, &update.max_price);
        overwrite(&mut self.price, &update.price);
        overwrite(&mut self.neighbourhood, &update.neighbourhood);
        overwrite(&mut self.room_type, &update.room_type);
        overwrite(&mut self.minimum_nights, &update.minimum_nights);
        overwrite(&mut self.rating, &update.rating);
        self.ratings.extend(update.ratings.iter());

        if update.max_price.is_some() && update.min_price.is_none() {
            self.min_price = None;
        }
        if update.min_price.is_some() && update.max_price.is_none() {
            self.max_price = None;
        }
        if !self.ratings.is_empty() && update.price.is_none() {
            self.price = None;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store (or replace) the user's rating for one listing.
    pub fn rate(&mut self, listing_id: ListingId, rating: u8) -> Result<()> {
        check_rating(listing_id, rating)?;
        self.ratings.insert(listing_id, rating);
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

fn check_rating(listing_id: ListingId, rating: u8) -> Result<()> {
    if rating > MAX_RATING {
        bail!(
            "rating {} for listing {} is out of range (0-{})",
            rating,
            listing_id,
            MAX_RATING
        );
    }
    Ok(())
}

/// Partial profile fields supplied by one interaction.
///
/// `None` means "not mentioned this time", never "erase".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub price: Option<f64>,
    pub neighbourhood: Option<String>,
    pub room_type: Option<String>,
    pub minimum_nights: Option<u32>,
    pub rating: Option<f64>,
    pub ratings: BTreeMap<ListingId, u8>,
}
