//! Testing utilities: a recording map library and chart renderer.
//!
//! Both keep their history behind shared handles so a test can hand one copy
//! to the code under test and inspect another.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::charts::{ChartHandle, ChartRenderer};
use crate::error::{MapError, MapResult};
use crate::map::{LatLng, MapLibrary, MapSurface, MarkerId, MarkerStyle, Stroke, TileLayer};

/// Something that happened to a recording surface, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    SetView { center: LatLng, zoom: u8 },
    AddTileLayer { url_template: String },
    InvalidateSize,
    CreateMarker { id: MarkerId },
    BindPopup { id: MarkerId },
    AddMarker { id: MarkerId },
    RemoveMarker { id: MarkerId },
    SetStroke { id: MarkerId, stroke: Stroke },
    OpenPopup { id: MarkerId },
    ClosePopup { id: MarkerId },
    Remove,
}

/// Current state of one marker on a recording surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMarker {
    pub id: MarkerId,
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: Option<String>,
    pub on_map: bool,
    pub popup_open: bool,
}

#[derive(Debug, Default)]
struct SurfaceLog {
    attach_calls: Vec<String>,
    events: Vec<SurfaceEvent>,
    markers: BTreeMap<MarkerId, RecordedMarker>,
    next_id: u64,
    removed: bool,
}

/// A mock map library whose surfaces record every call.
#[derive(Clone, Default)]
pub struct RecordingMapLibrary {
    /// Failure to report from `attach`
    fail_with: Option<MapError>,

    log: Arc<RwLock<SurfaceLog>>,
}

impl RecordingMapLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `attach` fail with `error`.
    pub fn failing(error: MapError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    /// Containers `attach` was called with.
    pub fn attach_calls(&self) -> Vec<String> {
        self.log.read().unwrap().attach_calls.clone()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.log.read().unwrap().events.clone()
    }

    /// Markers currently added to the map, in creation order.
    pub fn markers_on_map(&self) -> Vec<RecordedMarker> {
        self.log
            .read()
            .unwrap()
            .markers
            .values()
            .filter(|marker| marker.on_map)
            .cloned()
            .collect()
    }

    /// Markers on the map currently drawn with the highlight stroke.
    pub fn emphasized(&self) -> Vec<RecordedMarker> {
        self.markers_on_map()
            .into_iter()
            .filter(|marker| marker.style.stroke == Stroke::HIGHLIGHT)
            .collect()
    }

    /// Most recent view set on the surface.
    pub fn view(&self) -> Option<(LatLng, u8)> {
        self.log
            .read()
            .unwrap()
            .events
            .iter()
            .rev()
            .find_map(|event| match event {
                SurfaceEvent::SetView { center, zoom } => Some((*center, *zoom)),
                _ => None,
            })
    }

    pub fn is_removed(&self) -> bool {
        self.log.read().unwrap().removed
    }
}

#[async_trait]
impl MapLibrary for RecordingMapLibrary {
    type Surface = RecordingSurface;

    async fn attach(&self, container: &str) -> MapResult<RecordingSurface> {
        self.log
            .write()
            .unwrap()
            .attach_calls
            .push(container.to_string());

        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        Ok(RecordingSurface {
            log: Arc::clone(&self.log),
        })
    }
}

/// Surface handed out by [`RecordingMapLibrary`].
pub struct RecordingSurface {
    log: Arc<RwLock<SurfaceLog>>,
}

impl RecordingSurface {
    fn record(&self, event: SurfaceEvent) {
        self.log.write().unwrap().events.push(event);
    }

    fn with_marker(&self, id: MarkerId, f: impl FnOnce(&mut RecordedMarker)) {
        if let Some(marker) = self.log.write().unwrap().markers.get_mut(&id) {
            f(marker);
        }
    }
}

impl MapSurface for RecordingSurface {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.record(SurfaceEvent::SetView { center, zoom });
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) {
        self.record(SurfaceEvent::AddTileLayer {
            url_template: layer.url_template.clone(),
        });
    }

    fn invalidate_size(&mut self) {
        self.record(SurfaceEvent::InvalidateSize);
    }

    fn create_circle_marker(&mut self, position: LatLng, style: &MarkerStyle) -> MarkerId {
        let id = {
            let mut log = self.log.write().unwrap();
            let id = MarkerId(log.next_id);
            log.next_id += 1;
            log.markers.insert(
                id,
                RecordedMarker {
                    id,
                    position,
                    style: style.clone(),
                    popup: None,
                    on_map: false,
                    popup_open: false,
                },
            );
            id
        };
        self.record(SurfaceEvent::CreateMarker { id });
        id
    }

    fn bind_popup(&mut self, marker: MarkerId, html: &str) {
        self.with_marker(marker, |m| m.popup = Some(html.to_string()));
        self.record(SurfaceEvent::BindPopup { id: marker });
    }

    fn add_marker(&mut self, marker: MarkerId) {
        self.with_marker(marker, |m| m.on_map = true);
        self.record(SurfaceEvent::AddMarker { id: marker });
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.with_marker(marker, |m| {
            m.on_map = false;
            m.popup_open = false;
        });
        self.record(SurfaceEvent::RemoveMarker { id: marker });
    }

    fn marker_position(&self, marker: MarkerId) -> Option<LatLng> {
        self.log
            .read()
            .unwrap()
            .markers
            .get(&marker)
            .map(|m| m.position)
    }

    fn set_stroke(&mut self, marker: MarkerId, stroke: Stroke) {
        self.with_marker(marker, |m| m.style.stroke = stroke);
        self.record(SurfaceEvent::SetStroke { id: marker, stroke });
    }

    fn open_popup(&mut self, marker: MarkerId) {
        self.with_marker(marker, |m| m.popup_open = true);
        self.record(SurfaceEvent::OpenPopup { id: marker });
    }

    fn close_popup(&mut self, marker: MarkerId) {
        self.with_marker(marker, |m| m.popup_open = false);
        self.record(SurfaceEvent::ClosePopup { id: marker });
    }

    fn remove(&mut self) {
        {
            let mut log = self.log.write().unwrap();
            log.removed = true;
            for marker in log.markers.values_mut() {
                marker.on_map = false;
                marker.popup_open = false;
            }
        }
        self.record(SurfaceEvent::Remove);
    }
}

/// A chart mounted on a [`RecordingChartRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct MountedChart {
    pub handle: ChartHandle,
    pub surface: String,
    pub options: String,
}

/// Chart renderer that keeps mounted options in memory.
#[derive(Debug, Default)]
pub struct RecordingChartRenderer {
    mounted: Vec<MountedChart>,
    next_id: u64,
}

impl RecordingChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charts mounted and not yet disposed.
    pub fn mounted(&self) -> &[MountedChart] {
        &self.mounted
    }
}

impl ChartRenderer for RecordingChartRenderer {
    fn mount(&mut self, surface: &str, options: &str) -> ChartHandle {
        let handle = ChartHandle(self.next_id);
        self.next_id += 1;
        self.mounted.push(MountedChart {
            handle,
            surface: surface.to_string(),
            options: options.to_string(),
        });
        handle
    }

    fn dispose(&mut self, handle: ChartHandle) {
        self.mounted.retain(|chart| chart.handle != handle);
    }
}
