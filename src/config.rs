use anyhow::{Context, Result};
use serde::Deserialize;
use staymatch_core::filter::{FilterPolicy, RoomTypeMapping, DEFAULT_PRICE_TOLERANCE};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendConfig {
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: f64,
    #[serde(default)]
    pub room_type_mapping: RoomTypeMapping,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_shortlist")]
    pub shortlist: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            price_tolerance: DEFAULT_PRICE_TOLERANCE,
            room_type_mapping: RoomTypeMapping::default(),
            seed: None,
            shortlist: default_shortlist(),
        }
    }
}

impl RecommendConfig {
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy {
            price_tolerance: self.price_tolerance,
            room_type_mapping: self.room_type_mapping,
        }
    }
}

fn default_price_tolerance() -> f64 {
    DEFAULT_PRICE_TOLERANCE
}
fn default_shortlist() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for everything but the catalog location.
    ///
    /// Used when the CLI is pointed at a catalog without a config file.
    pub fn with_catalog(path: PathBuf) -> Self {
        Self {
            catalog: CatalogConfig { path },
            recommend: RecommendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.catalog.path.as_os_str().is_empty() {
        anyhow::bail!("catalog.path must not be empty");
    }

    let tolerance = config.recommend.price_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        anyhow::bail!("recommend.price_tolerance must be a finite number >= 0");
    }

    if config.recommend.shortlist < 1 {
        anyhow::bail!("recommend.shortlist must be >= 1");
    }

    EnvFilter::try_new(&config.logging.filter).with_context(|| {
        format!(
            "logging.filter is not a valid filter directive: '{}'",
            config.logging.filter
        )
    })?;

    Ok(())
}
