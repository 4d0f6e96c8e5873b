//! Catalog loading from the ETL output.
//!
//! The ETL step writes the listing table as one JSON document: the column
//! layout (neighbourhood, room-type and feature names) followed by the rows.
//!
//! ```json
//! {
//!   "neighbourhoods": ["Brooklyn", "Manhattan"],
//!   "room_types": ["Entire home/apt", "Private room"],
//!   "features": ["wifi", "kitchen"],
//!   "listings": [
//!     {"id": 2539, "name": "Clean & quiet apt", "price": 149, "rating": 4.7,
//!      "minimum_nights": 1, "neighbourhoods": [1, 0], "room_types": [0, 1],
//!      "features": [1, 0], "images": ["https://…/1.jpg"]}
//!   ]
//! }
//! ```
//!
//! Loading happens once at startup; the resulting [`Catalog`] is shared
//! read-only behind an `Arc`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use staymatch_core::models::{Catalog, CatalogSchema, Listing};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// A producer of the listing table.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Load and validate the full catalog.
    async fn load(&self) -> Result<Catalog>;
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(flatten)]
    schema: CatalogSchema,
    listings: Vec<Listing>,
}

/// Parse a catalog JSON document.
pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let file: CatalogFile =
        serde_json::from_str(json).with_context(|| "Failed to parse catalog JSON")?;
    Catalog::new(file.schema, file.listings)
}

/// Catalog stored as a JSON file on disk.
pub struct JsonCatalog {
    path: PathBuf,
    name: String,
}

impl JsonCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("json:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Catalog> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))?;
        parse_catalog(&content)
            .with_context(|| format!("Invalid catalog file: {}", self.path.display()))
    }
}

/// Load the catalog configured in `[catalog]`.
pub async fn load_catalog(config: &Config) -> Result<Arc<Catalog>> {
    let source = JsonCatalog::new(&config.catalog.path);
    let catalog = source.load().await?;
    info!(
        source = source.name(),
        listings = catalog.len(),
        features = catalog.schema().features.len(),
        "catalog loaded"
    );
    Ok(Arc::new(catalog))
}
