//! Listing details shown alongside a recommendation.
//!
//! The recommendation itself only carries a listing id. A
//! [`ListingDetailsSource`] turns that id into a page URL, a title, images and
//! a rating for display. Lookups may fail (remote page gone, listing
//! delisted); callers go through [`fetch_or_empty`] so a failed lookup still
//! yields a reply with just the id and URL.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use staymatch_core::models::{Catalog, ListingId};
use tracing::warn;

use crate::display::listing_url;

/// Display data for one listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetails {
    pub id: ListingId,
    pub url: String,
    pub title: String,
    pub images: Vec<String>,
    pub rating: Option<f64>,
}

impl ListingDetails {
    /// Placeholder used when the lookup failed.
    pub fn empty(id: ListingId) -> Self {
        Self {
            id,
            url: listing_url(id),
            title: String::new(),
            images: Vec::new(),
            rating: None,
        }
    }
}

/// A producer of listing display data.
#[async_trait]
pub trait ListingDetailsSource: Send + Sync {
    async fn fetch(&self, id: ListingId) -> Result<ListingDetails>;
}

/// Look up details, degrading to [`ListingDetails::empty`] on failure.
pub async fn fetch_or_empty(source: &dyn ListingDetailsSource, id: ListingId) -> ListingDetails {
    match source.fetch(id).await {
        Ok(details) => details,
        Err(e) => {
            warn!(listing_id = id, error = %e, "listing details lookup failed");
            ListingDetails::empty(id)
        }
    }
}

/// Details served from the catalog's own name, image and rating columns.
pub struct CatalogDetails {
    catalog: Arc<Catalog>,
}

impl CatalogDetails {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ListingDetailsSource for CatalogDetails {
    async fn fetch(&self, id: ListingId) -> Result<ListingDetails> {
        let listing = self
            .catalog
            .get(id)
            .ok_or_else(|| anyhow!("listing {} is not in the catalog", id))?;
        Ok(ListingDetails {
            id,
            url: listing_url(id),
            title: listing.name.clone().unwrap_or_default(),
            images: listing.images.clone(),
            rating: (listing.rating > 0.0).then_some(listing.rating),
        })
    }
}
