//! Mapping library abstraction.
//!
//! Mirrors the handful of primitives the dashboard needs from a slippy-map
//! library: a base tile layer, view control, and circle markers with popups.

use async_trait::async_trait;

use crate::error::MapResult;
use crate::metric::City;

/// Matching tolerance in degrees, applied to latitude and longitude separately.
///
/// Absorbs rounding in coordinates that went through a backend round trip.
/// Two cities closer than this on both axes are indistinguishable; the first
/// rendered one wins.
pub const COORDINATE_TOLERANCE_DEG: f64 = 0.01;

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn of(city: &City) -> Self {
        Self::new(city.lat, city.lng)
    }

    /// Whether `city` sits within [`COORDINATE_TOLERANCE_DEG`] of this position.
    pub fn matches(&self, city: &City) -> bool {
        (self.lat - city.lat).abs() < COORDINATE_TOLERANCE_DEG
            && (self.lng - city.lng).abs() < COORDINATE_TOLERANCE_DEG
    }
}

/// Surface-assigned marker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Full style of a circle marker at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: &'static str,
    pub stroke: Stroke,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    /// Default marker look for the given size and tier colour.
    pub fn circle(radius: f64, fill_color: &'static str) -> Self {
        Self {
            radius,
            fill_color,
            stroke: Stroke::DEFAULT,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// Outline of a marker; the only part that changes on highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub weight: u32,
    pub color: &'static str,
}

impl Stroke {
    pub const DEFAULT: Stroke = Stroke {
        weight: 2,
        color: "#ffffff",
    };

    pub const HIGHLIGHT: Stroke = Stroke {
        weight: 4,
        color: "#000000",
    };
}

/// Base tile layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 18,
        }
    }
}

/// A live map attached to a container.
pub trait MapSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn add_tile_layer(&mut self, layer: &TileLayer);

    /// Recompute the viewport after the container settles.
    fn invalidate_size(&mut self);

    /// Create a marker without adding it to the map.
    fn create_circle_marker(&mut self, position: LatLng, style: &MarkerStyle) -> MarkerId;

    fn bind_popup(&mut self, marker: MarkerId, html: &str);

    fn add_marker(&mut self, marker: MarkerId);

    fn remove_marker(&mut self, marker: MarkerId);

    /// Current position of a marker, `None` if unknown to the surface.
    fn marker_position(&self, marker: MarkerId) -> Option<LatLng>;

    fn set_stroke(&mut self, marker: MarkerId, stroke: Stroke);

    fn open_popup(&mut self, marker: MarkerId);

    fn close_popup(&mut self, marker: MarkerId);

    /// Detach from the container and release every layer and marker.
    fn remove(&mut self);
}

/// Loads the mapping library and attaches a surface to a container.
#[async_trait]
pub trait MapLibrary: Send + Sync {
    type Surface: MapSurface + Send;

    async fn attach(&self, container: &str) -> MapResult<Self::Surface>;
}
