//! Integration tests for the map interaction controller.
//!
//! These drive the controller against a recording surface and check what
//! ended up on the map:
//! 1. Initialisation and its failure modes
//! 2. Marker rendering and re-rendering
//! 3. Highlight, reset, and zoom transitions
//! 4. Teardown

use geo_dashboard::error::MapError;
use geo_dashboard::map::{LatLng, MapController, MapStatus, Stroke};
use geo_dashboard::metric::{City, MetricKey};
use geo_dashboard::testing::{RecordingMapLibrary, SurfaceEvent};

fn johannesburg() -> City {
    City::new("Johannesburg", -26.2041, 28.0473)
        .with_revenue(90_000.0)
        .with_sessions(4_000.0)
}

fn cape_town() -> City {
    City::new("Cape Town", -33.9249, 18.4241)
        .with_revenue(45_000.0)
        .with_sessions(6_000.0)
}

fn durban() -> City {
    City::new("Durban", -29.8587, 31.0218)
        .with_revenue(10_000.0)
        .with_sessions(1_000.0)
}

/// Helper to create a ready controller with three cities rendered.
async fn ready_controller() -> (MapController<RecordingMapLibrary>, RecordingMapLibrary) {
    let library = RecordingMapLibrary::new();
    let mut map = MapController::new(library.clone());

    map.initialize(Some("map")).await;
    map.render_markers(vec![johannesburg(), cape_town(), durban()], MetricKey::Revenue);

    (map, library)
}

#[tokio::test]
async fn test_initialize_sets_view_and_base_layer() {
    let library = RecordingMapLibrary::new();
    let mut map = MapController::new(library.clone());

    assert_eq!(map.initialize(Some("map")).await, &MapStatus::Ready);
    assert!(map.is_ready());

    let events = library.events();
    assert_eq!(
        events[0],
        SurfaceEvent::SetView {
            center: LatLng::new(-28.5, 24.5),
            zoom: 5
        }
    );
    assert_eq!(
        events[1],
        SurfaceEvent::AddTileLayer {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
        }
    );
    assert_eq!(events[2], SurfaceEvent::InvalidateSize);
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let library = RecordingMapLibrary::new();
    let mut map = MapController::new(library.clone());

    map.initialize(Some("map")).await;
    map.initialize(Some("map")).await;

    assert_eq!(library.attach_calls(), vec!["map".to_string()]);
}

#[tokio::test]
async fn test_initialize_without_container_is_noop() {
    let library = RecordingMapLibrary::new();
    let mut map = MapController::new(library.clone());

    assert_eq!(map.initialize(None).await, &MapStatus::NoContainer);
    assert!(!map.is_ready());
    assert!(library.attach_calls().is_empty());
}

#[tokio::test]
async fn test_library_failure_degrades_without_error() {
    let library = RecordingMapLibrary::failing(MapError::LibraryLoad("script blocked".into()));
    let mut map = MapController::new(library.clone());

    let status = map.initialize(Some("map")).await.clone();

    assert_eq!(
        status,
        MapStatus::Unavailable("map library failed to load: script blocked".into())
    );
    assert!(!map.is_ready());

    // Every other operation quietly does nothing
    map.render_markers(vec![durban()], MetricKey::Revenue);
    assert!(!map.highlight(&durban()));
    assert!(!map.zoom_to(&durban()));
    map.reset_highlight();
    assert!(library.events().is_empty());
}

#[tokio::test]
async fn test_cities_supplied_before_initialize_are_rendered() {
    let library = RecordingMapLibrary::new();
    let mut map = MapController::new(library.clone());

    map.render_markers(vec![johannesburg(), durban()], MetricKey::Revenue);
    assert!(library.markers_on_map().is_empty());

    map.initialize(Some("map")).await;
    assert_eq!(library.markers_on_map().len(), 2);
}

#[tokio::test]
async fn test_render_one_marker_per_city() {
    let (map, library) = ready_controller().await;

    let markers = library.markers_on_map();
    assert_eq!(markers.len(), 3);
    assert_eq!(map.markers().len(), 3);

    // Johannesburg holds the maximum revenue
    assert_eq!(markers[0].style.radius, 20.0);
    assert_eq!(markers[0].style.fill_color, "#ef4444");
    assert_eq!(markers[0].style.stroke, Stroke::DEFAULT);
    assert_eq!(markers[1].style.fill_color, "#f59e0b");
    assert_eq!(markers[2].style.fill_color, "#10b981");

    let popup = markers[1].popup.as_deref().unwrap();
    assert!(popup.contains("<strong>Cape Town</strong>"));
    assert!(popup.contains("Sessions: "));
}

#[tokio::test]
async fn test_rerender_replaces_markers() {
    let (mut map, library) = ready_controller().await;

    map.render_markers(vec![durban(), cape_town()], MetricKey::Sessions);

    let markers = library.markers_on_map();
    assert_eq!(markers.len(), 2);
    assert_eq!(map.markers().len(), 2);
    assert_eq!(markers[0].position, LatLng::new(-29.8587, 31.0218));

    let removed = library
        .events()
        .iter()
        .filter(|event| matches!(event, SurfaceEvent::RemoveMarker { .. }))
        .count();
    assert_eq!(removed, 3);
}

#[tokio::test]
async fn test_render_empty_collection_keeps_markers() {
    let (mut map, library) = ready_controller().await;

    map.render_markers(Vec::new(), MetricKey::Sessions);

    assert_eq!(library.markers_on_map().len(), 3);
    assert_eq!(map.metric(), MetricKey::Revenue);
}

#[tokio::test]
async fn test_set_metric_recolours_markers() {
    let (mut map, library) = ready_controller().await;

    map.set_metric(MetricKey::Sessions);

    let markers = library.markers_on_map();
    assert_eq!(markers.len(), 3);
    // Cape Town leads on sessions
    assert_eq!(markers[1].style.radius, 20.0);
    assert_eq!(map.color_of(&cape_town()), "#ef4444");
    assert_eq!(map.label_of(&cape_town()), geo_dashboard::format::number(6_000.0));
}

#[tokio::test]
async fn test_highlight_emphasises_and_opens_popup() {
    let (mut map, library) = ready_controller().await;

    assert!(map.highlight(&cape_town()));

    let emphasized = library.emphasized();
    assert_eq!(emphasized.len(), 1);
    assert_eq!(emphasized[0].position, LatLng::of(&cape_town()));
    assert!(emphasized[0].popup_open);
    assert_eq!(map.highlighted().map(|c| c.name.as_str()), Some("Cape Town"));
}

#[tokio::test]
async fn test_highlight_absorbs_coordinate_jitter() {
    let (mut map, library) = ready_controller().await;

    let refetched = City::new("Durban", -29.8551, 31.0262);
    assert!(map.highlight(&refetched));
    assert_eq!(library.emphasized()[0].position, LatLng::of(&durban()));
}

#[tokio::test]
async fn test_highlight_without_matching_marker_is_noop() {
    let (mut map, library) = ready_controller().await;
    map.highlight(&durban());
    let before = library.events();

    let nowhere = City::new("Kimberley", -28.7282, 24.7499);
    assert!(!map.highlight(&nowhere));

    assert_eq!(library.events(), before);
    assert_eq!(map.highlighted().map(|c| c.name.as_str()), Some("Durban"));
    assert_eq!(library.emphasized().len(), 1);
}

#[tokio::test]
async fn test_highlight_switch_restores_previous_once() {
    let (mut map, library) = ready_controller().await;
    let a = map.markers()[0].id;
    let b = map.markers()[1].id;

    map.highlight(&johannesburg());
    let start = library.events().len();
    map.highlight(&cape_town());

    let events = library.events()[start..].to_vec();
    assert_eq!(
        events,
        vec![
            SurfaceEvent::SetStroke {
                id: a,
                stroke: Stroke::DEFAULT
            },
            SurfaceEvent::SetStroke {
                id: b,
                stroke: Stroke::HIGHLIGHT
            },
            SurfaceEvent::OpenPopup { id: b },
        ]
    );

    let emphasized = library.emphasized();
    assert_eq!(emphasized.len(), 1);
    assert_eq!(emphasized[0].id, b);
}

#[tokio::test]
async fn test_reset_highlight() {
    let (mut map, library) = ready_controller().await;

    map.highlight(&durban());
    map.reset_highlight();

    assert!(library.emphasized().is_empty());
    assert!(library.markers_on_map().iter().all(|m| !m.popup_open));
    assert_eq!(map.highlighted(), None);

    // Nothing highlighted: no surface calls
    let before = library.events();
    map.reset_highlight();
    assert_eq!(library.events(), before);
}

#[tokio::test]
async fn test_rerender_clears_highlight() {
    let (mut map, library) = ready_controller().await;

    map.highlight(&durban());
    map.render_markers(vec![durban()], MetricKey::Revenue);

    assert_eq!(map.highlighted(), None);
    assert!(library.emphasized().is_empty());
}

#[tokio::test]
async fn test_zoom_to_recentres_then_highlights() {
    let (mut map, library) = ready_controller().await;

    assert!(map.zoom_to(&johannesburg()));

    assert_eq!(library.view(), Some((LatLng::of(&johannesburg()), 10)));
    assert_eq!(library.emphasized()[0].position, LatLng::of(&johannesburg()));
}

#[tokio::test]
async fn test_teardown_is_terminal() {
    let (mut map, library) = ready_controller().await;
    map.highlight(&durban());

    map.teardown();

    assert!(library.is_removed());
    assert!(library.markers_on_map().is_empty());
    assert!(map.markers().is_empty());
    assert_eq!(map.status(), &MapStatus::TornDown);

    let before = library.events();
    map.render_markers(vec![durban()], MetricKey::Revenue);
    assert!(!map.highlight(&durban()));
    assert!(!map.zoom_to(&durban()));
    map.reset_highlight();
    assert_eq!(map.initialize(Some("map")).await, &MapStatus::TornDown);

    assert_eq!(library.events(), before);
    assert_eq!(library.attach_calls().len(), 1);
}
