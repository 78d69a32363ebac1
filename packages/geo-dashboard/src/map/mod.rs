//! City map: surface abstraction, popup markup, and the interaction controller.

pub mod controller;
pub mod popup;
pub mod surface;

pub use controller::{MapController, MapOptions, MapStatus, MarkerRecord};
pub use popup::popup_html;
pub use surface::{
    LatLng, MapLibrary, MapSurface, MarkerId, MarkerStyle, Stroke, TileLayer,
    COORDINATE_TOLERANCE_DEG,
};
