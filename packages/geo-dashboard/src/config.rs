use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::map::{MapOptions, TileLayer};
use crate::metric::MetricKey;

/// Dashboard configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base: String,
    pub tile_url: String,
    pub default_metric: MetricKey,
}

impl DashboardConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            api_base: env::var("ANALYTICS_API_BASE")
                .context("ANALYTICS_API_BASE must be set")?,
            tile_url: env::var("MAP_TILE_URL")
                .unwrap_or_else(|_| TileLayer::default().url_template),
            default_metric: env::var("MAP_DEFAULT_METRIC")
                .map(|key| MetricKey::parse_or_default(&key))
                .unwrap_or_default(),
        })
    }

    /// Map options with the configured tile source.
    pub fn map_options(&self) -> MapOptions {
        MapOptions::new().with_tile_url(self.tile_url.clone())
    }
}
