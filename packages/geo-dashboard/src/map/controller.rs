//! Marker lifecycle and highlight state over a map surface.

use tracing::{debug, error, info};

use crate::format::{UsdFormatter, ValueFormatter};
use crate::map::popup::popup_html;
use crate::map::surface::{LatLng, MapLibrary, MapSurface, MarkerId, MarkerStyle, Stroke, TileLayer};
use crate::metric::{City, MetricKey, MetricMapper};

/// View and base layer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Initial view centre
    pub center: LatLng,

    /// Initial zoom level
    pub zoom: u8,

    /// Zoom level used when focusing a single city
    pub focus_zoom: u8,

    pub tile_layer: TileLayer,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(-28.5, 24.5),
            zoom: 5,
            focus_zoom: 10,
            tile_layer: TileLayer::default(),
        }
    }
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_center(mut self, center: LatLng, zoom: u8) -> Self {
        self.center = center;
        self.zoom = zoom;
        self
    }

    pub fn with_focus_zoom(mut self, zoom: u8) -> Self {
        self.focus_zoom = zoom;
        self
    }

    pub fn with_tile_url(mut self, url_template: impl Into<String>) -> Self {
        self.tile_layer.url_template = url_template.into();
        self
    }
}

/// Observable outcome of map initialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapStatus {
    Uninitialized,
    /// No container was available to attach to
    NoContainer,
    /// The library failed to load; the map stays non-functional
    Unavailable(String),
    Ready,
    TornDown,
}

/// A rendered marker and the city it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub city: City,
}

enum Lifecycle<S> {
    Uninitialized,
    Ready(S),
    TornDown,
}

/// Owns the map surface, its markers, the metric selection, and the single
/// highlighted marker.
///
/// Failures are logged and reflected in [`MapStatus`]; no method returns an
/// error, since the map is a secondary view.
pub struct MapController<L: MapLibrary> {
    library: L,
    options: MapOptions,
    formatter: Box<dyn ValueFormatter>,
    lifecycle: Lifecycle<L::Surface>,
    status: MapStatus,
    cities: Vec<City>,
    metric: MetricKey,
    markers: Vec<MarkerRecord>,
    /// Index into `markers`
    highlighted: Option<usize>,
}

impl<L: MapLibrary> MapController<L> {
    pub fn new(library: L) -> Self {
        Self::with_options(library, MapOptions::default())
    }

    pub fn with_options(library: L, options: MapOptions) -> Self {
        Self {
            library,
            options,
            formatter: Box::new(UsdFormatter),
            lifecycle: Lifecycle::Uninitialized,
            status: MapStatus::Uninitialized,
            cities: Vec::new(),
            metric: MetricKey::default(),
            markers: Vec::new(),
            highlighted: None,
        }
    }

    /// Use a different formatter for popups.
    pub fn with_formatter(mut self, formatter: impl ValueFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    pub fn metric(&self) -> MetricKey {
        self.metric
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        &self.markers
    }

    /// City of the highlighted marker, if any.
    pub fn highlighted(&self) -> Option<&City> {
        self.highlighted.map(|index| &self.markers[index].city)
    }

    /// Colour of `city` against the current collection and metric.
    pub fn color_of(&self, city: &City) -> &'static str {
        MetricMapper::new(&self.cities, self.metric).color_of(city)
    }

    /// Formatted value of the selected metric for `city`.
    pub fn label_of(&self, city: &City) -> String {
        MetricMapper::new(&self.cities, self.metric).label_of(city, self.formatter.as_ref())
    }

    /// Attach to `container`, add the base layer, and render any cities
    /// already supplied.
    ///
    /// Does nothing once initialised or torn down. A missing container or a
    /// library failure leaves the controller uninitialised so a later call
    /// can retry.
    pub async fn initialize(&mut self, container: Option<&str>) -> &MapStatus {
        if !matches!(self.lifecycle, Lifecycle::Uninitialized) {
            return &self.status;
        }

        let Some(container) = container else {
            debug!("No map container available");
            self.status = MapStatus::NoContainer;
            return &self.status;
        };

        let mut surface = match self.library.attach(container).await {
            Ok(surface) => surface,
            Err(e) => {
                error!(container, error = %e, "Failed to load map");
                self.status = MapStatus::Unavailable(e.to_string());
                return &self.status;
            }
        };

        surface.set_view(self.options.center, self.options.zoom);
        surface.add_tile_layer(&self.options.tile_layer);
        surface.invalidate_size();

        self.lifecycle = Lifecycle::Ready(surface);
        self.status = MapStatus::Ready;
        info!(container, "Map ready");

        self.refresh_markers();
        &self.status
    }

    /// Replace the city collection and metric, then redraw every marker.
    ///
    /// An empty collection is ignored, leaving the current markers in place.
    pub fn render_markers(&mut self, cities: Vec<City>, metric: MetricKey) {
        if cities.is_empty() || matches!(self.lifecycle, Lifecycle::TornDown) {
            return;
        }

        self.cities = cities;
        self.metric = metric;
        self.refresh_markers();
    }

    /// Switch the metric and redraw the current collection.
    pub fn set_metric(&mut self, metric: MetricKey) {
        if matches!(self.lifecycle, Lifecycle::TornDown) {
            return;
        }

        self.metric = metric;
        self.refresh_markers();
    }

    fn refresh_markers(&mut self) {
        let Lifecycle::Ready(surface) = &mut self.lifecycle else {
            return;
        };
        if self.cities.is_empty() {
            return;
        }

        for record in self.markers.drain(..) {
            surface.remove_marker(record.id);
        }
        self.highlighted = None;

        let mapper = MetricMapper::new(&self.cities, self.metric);
        for city in &self.cities {
            let style = MarkerStyle::circle(mapper.radius_of(city), mapper.color_of(city));
            let id = surface.create_circle_marker(LatLng::of(city), &style);
            surface.bind_popup(id, &popup_html(city, self.formatter.as_ref()));
            surface.add_marker(id);

            self.markers.push(MarkerRecord {
                id,
                city: city.clone(),
            });
        }

        debug!(
            count = self.markers.len(),
            metric = %self.metric,
            max_value = mapper.max_value(),
            "Rendered map markers"
        );
    }

    /// Emphasise the marker at `city`'s position and open its popup.
    ///
    /// Returns `false`, changing nothing, when no marker is within
    /// [`COORDINATE_TOLERANCE_DEG`](crate::map::COORDINATE_TOLERANCE_DEG).
    pub fn highlight(&mut self, city: &City) -> bool {
        let Lifecycle::Ready(surface) = &mut self.lifecycle else {
            return false;
        };

        let Some(index) = self.markers.iter().position(|record| {
            surface
                .marker_position(record.id)
                .is_some_and(|position| position.matches(city))
        }) else {
            debug!(city = %city.name, "No marker at city position");
            return false;
        };

        if let Some(previous) = self.highlighted.take() {
            surface.set_stroke(self.markers[previous].id, Stroke::DEFAULT);
        }

        let id = self.markers[index].id;
        surface.set_stroke(id, Stroke::HIGHLIGHT);
        surface.open_popup(id);
        self.highlighted = Some(index);

        true
    }

    /// Restore the highlighted marker and close its popup.
    pub fn reset_highlight(&mut self) {
        let Lifecycle::Ready(surface) = &mut self.lifecycle else {
            return;
        };

        if let Some(index) = self.highlighted.take() {
            let id = self.markers[index].id;
            surface.set_stroke(id, Stroke::DEFAULT);
            surface.close_popup(id);
        }
    }

    /// Centre the map on `city` at the focus zoom, then highlight it.
    pub fn zoom_to(&mut self, city: &City) -> bool {
        let Lifecycle::Ready(surface) = &mut self.lifecycle else {
            return false;
        };

        surface.set_view(LatLng::of(city), self.options.focus_zoom);
        self.highlight(city)
    }

    /// Detach the surface and drop every marker. Terminal.
    pub fn teardown(&mut self) {
        if let Lifecycle::Ready(mut surface) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::TornDown)
        {
            surface.remove();
            info!("Map torn down");
        }

        self.lifecycle = Lifecycle::TornDown;
        self.status = MapStatus::TornDown;
        self.markers.clear();
        self.highlighted = None;
    }
}
