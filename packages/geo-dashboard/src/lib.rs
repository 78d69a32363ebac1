//! Geo-visualization layer of the analytics dashboard.
//!
//! Turns a city collection and a selected metric into coloured, sized map
//! markers, keeps a single highlighted marker, and builds the dashboard's
//! bar and line charts. Data comes from [`analytics_client`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use geo_dashboard::map::MapController;
//! use geo_dashboard::metric::{City, MetricKey};
//!
//! let mut map = MapController::new(library);
//! map.initialize(Some("map")).await;
//!
//! map.render_markers(cities, MetricKey::Sessions);
//! map.zoom_to(&cities[0]);
//! map.reset_highlight();
//! map.teardown();
//! ```
//!
//! # Modules
//!
//! - [`format`] - Currency, count, and percent formatting
//! - [`metric`] - Metric keys and the city-to-visual mapping
//! - [`map`] - Mapping library traits and the interaction controller
//! - [`charts`] - Chart options and the chart factory
//! - [`testing`] - Recording implementations for tests

pub mod charts;
pub mod config;
pub mod error;
pub mod format;
pub mod map;
pub mod metric;
pub mod testing;

pub use charts::{ChartConfig, ChartFactory, ChartHandle, ChartRenderer};
pub use config::DashboardConfig;
pub use error::{MapError, MapResult};
pub use format::{UsdFormatter, ValueFormatter};
pub use map::{MapController, MapLibrary, MapStatus, MapSurface};
pub use metric::{City, MetricKey, MetricMapper, Tier};
