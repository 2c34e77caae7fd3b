use std::cell::RefCell;
use std::rc::Rc;

use route_builder_store::{LatLon, WaypointId};

use crate::app::{RouteApp, NOT_FOUND_NOTICE};
use crate::geocode::{GeocodeOutcome, Geocoder};
use crate::map::{MapError, MapSurface, Viewport};

/// Records every SDK call instead of touching the glue. The assert in
/// `create` keeps the teardown-before-rebuild lifecycle honest in every test.
#[derive(Default)]
struct FakeMap {
    viewport: Option<Viewport>,
    markers: Vec<(WaypointId, LatLon, String)>,
    paths: Vec<Vec<LatLon>>,
    creates: Vec<Viewport>,
    destroys: usize,
    fail_create: bool,
}

impl MapSurface for FakeMap {
    fn create(&mut self, viewport: Viewport) -> Result<(), MapError> {
        assert!(self.viewport.is_none(), "create without destroy");
        if self.fail_create {
            return Err(MapError::Sdk("service unavailable".to_string()));
        }
        self.creates.push(viewport);
        self.viewport = Some(viewport);
        Ok(())
    }

    fn destroy(&mut self) {
        if self.viewport.take().is_some() {
            self.destroys += 1;
        }
        self.markers.clear();
        self.paths.clear();
    }

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn add_marker(&mut self, id: WaypointId, at: LatLon, hint: &str) -> Result<(), MapError> {
        if self.viewport.is_none() {
            return Err(MapError::NotReady);
        }
        self.markers.push((id, at, hint.to_string()));
        Ok(())
    }

    fn add_path(&mut self, points: &[LatLon]) -> Result<(), MapError> {
        if self.viewport.is_none() {
            return Err(MapError::NotReady);
        }
        self.paths.push(points.to_vec());
        Ok(())
    }
}

/// Holds every request until the test resolves it, in whatever order the
/// test wants. That's exactly what the unsequenced network gives the page.
#[derive(Default)]
struct ManualGeocoder {
    pending: RefCell<Vec<(String, Box<dyn FnOnce(GeocodeOutcome)>)>>,
}

impl Geocoder for ManualGeocoder {
    fn geocode(&self, query: &str, done: Box<dyn FnOnce(GeocodeOutcome)>) {
        self.pending.borrow_mut().push((query.to_string(), done));
    }
}

impl ManualGeocoder {
    fn resolve(&self, query: &str, outcome: GeocodeOutcome) {
        let mut pending = self.pending.borrow_mut();
        let idx = pending
            .iter()
            .position(|(pending_query, _)| pending_query == query)
            .unwrap();
        let (_, done) = pending.remove(idx);
        drop(pending);
        done(outcome);
    }
}

fn started() -> RouteApp<FakeMap> {
    let mut app = RouteApp::new(FakeMap::default());
    app.start(Viewport::default()).unwrap();
    app
}

// Simulate a submission whose geocoding succeeded
fn add(app: &mut RouteApp<FakeMap>, name: &str, lat: f64, lon: f64) -> WaypointId {
    let changed = app
        .finish_geocode(name, GeocodeOutcome::Found(LatLon::new(lat, lon)))
        .unwrap();
    assert!(changed);
    app.store().waypoints().last().unwrap().id
}

fn names(app: &RouteApp<FakeMap>) -> Vec<String> {
    app.store()
        .waypoints()
        .iter()
        .map(|waypt| waypt.name.clone())
        .collect()
}

// Simulate a submission through the gateway, leaving the response pending
fn submit(app: &Rc<RefCell<RouteApp<FakeMap>>>, geocoder: &ManualGeocoder, name: &str) {
    let app = app.clone();
    let query = name.to_string();
    let name = name.to_string();
    geocoder.geocode(
        &query,
        Box::new(move |outcome| {
            app.borrow_mut().finish_geocode(&name, outcome).unwrap();
        }),
    );
}

#[test]
fn test_add_then_remove_matches_worked_example() {
    let mut app = started();

    let a = add(&mut app, "A", 10.0, 20.0);
    assert_eq!(app.map.markers.len(), 1);
    assert!(app.map.paths.is_empty(), "one stop draws no connecting line");

    add(&mut app, "B", 30.0, 40.0);
    {
        let waypts = app.store().waypoints();
        assert_eq!(waypts[0].name, "A");
        assert_eq!(waypts[0].coords, LatLon::new(10.0, 20.0));
        assert_eq!(waypts[0].order, 1);
        assert_eq!(waypts[1].name, "B");
        assert_eq!(waypts[1].coords, LatLon::new(30.0, 40.0));
        assert_eq!(waypts[1].order, 2);
    }
    assert_eq!(app.map.markers.len(), 2);
    assert_eq!(
        app.map.paths,
        vec![vec![LatLon::new(10.0, 20.0), LatLon::new(30.0, 40.0)]]
    );

    app.remove(a).unwrap();
    let waypts = app.store().waypoints();
    assert_eq!(waypts.len(), 1);
    assert_eq!(waypts[0].name, "B");
    assert_eq!(waypts[0].order, 2);
    assert_eq!(app.map.markers.len(), 1);
    assert!(app.map.paths.is_empty());
}

#[test]
fn test_remove_unknown_id_is_noop() {
    let mut app = started();
    add(&mut app, "A", 10.0, 20.0);

    app.remove(WaypointId(99)).unwrap();
    assert_eq!(names(&app), vec!["A"]);
}

#[test]
fn test_reorder_swaps_display_positions() {
    let mut app = started();
    let a = add(&mut app, "A", 1.0, 1.0);
    add(&mut app, "B", 2.0, 2.0);
    let c = add(&mut app, "C", 3.0, 3.0);
    add(&mut app, "D", 4.0, 4.0);

    app.reorder(a, c).unwrap();
    assert_eq!(names(&app), vec!["C", "B", "A", "D"]);

    // Markers and the line follow the new display order
    let marker_hints: Vec<&str> = app.map.markers.iter().map(|(_, _, hint)| hint.as_str()).collect();
    assert_eq!(marker_hints, vec!["C", "B", "A", "D"]);
    assert_eq!(
        app.map.paths,
        vec![vec![
            LatLon::new(3.0, 3.0),
            LatLon::new(2.0, 2.0),
            LatLon::new(1.0, 1.0),
            LatLon::new(4.0, 4.0),
        ]]
    );
}

#[test]
fn test_marker_drag_updates_only_that_waypoint() {
    let mut app = started();
    add(&mut app, "A", 10.0, 20.0);
    let b = add(&mut app, "B", 30.0, 40.0);

    app.marker_dragged(b, LatLon::new(50.0, 60.0)).unwrap();

    let waypts = app.store().waypoints();
    assert_eq!(waypts[0].name, "A");
    assert_eq!(waypts[0].coords, LatLon::new(10.0, 20.0));
    assert_eq!(waypts[0].order, 1);
    assert_eq!(waypts[1].id, b);
    assert_eq!(waypts[1].name, "B");
    assert_eq!(waypts[1].coords, LatLon::new(50.0, 60.0));
    assert_eq!(waypts[1].order, 2);

    // The rebuilt line reflects the drop position
    assert_eq!(
        app.map.paths,
        vec![vec![LatLon::new(10.0, 20.0), LatLon::new(50.0, 60.0)]]
    );
}

#[test]
fn test_not_found_sets_notice_and_leaves_list_alone() {
    let mut app = started();
    add(&mut app, "A", 10.0, 20.0);
    let creates_before = app.map.creates.len();

    let changed = app
        .finish_geocode("nowhere", GeocodeOutcome::NotFound)
        .unwrap();
    assert!(!changed);
    assert_eq!(names(&app), vec!["A"]);
    assert_eq!(app.notice(), Some(NOT_FOUND_NOTICE));
    // No mutation, no redraw
    assert_eq!(app.map.creates.len(), creates_before);

    app.clear_notice();
    assert_eq!(app.notice(), None);
}

#[test]
fn test_failed_geocode_preserves_state_without_notice() {
    let mut app = started();
    add(&mut app, "A", 10.0, 20.0);

    let changed = app
        .finish_geocode("B", GeocodeOutcome::Failed("timeout".to_string()))
        .unwrap();
    assert!(!changed);
    assert_eq!(names(&app), vec!["A"]);
    assert_eq!(app.notice(), None);
}

#[test]
fn test_initial_render_uses_default_viewport() {
    let mut app = RouteApp::new(FakeMap::default());
    assert_eq!(app.map.viewport(), None);

    app.start(Viewport::default()).unwrap();
    assert_eq!(app.map.creates, vec![Viewport::default()]);
    assert_eq!(app.map.viewport(), Some(Viewport::default()));
    assert_eq!(app.map.destroys, 0);
}

#[test]
fn test_mutations_keep_the_current_viewport() {
    let mut app = started();
    add(&mut app, "A", 10.0, 20.0);

    // The user pans and zooms away from the default
    let panned = Viewport {
        center: LatLon::new(40.4168, -3.7038),
        zoom: 11.0,
    };
    app.map.viewport = Some(panned);

    add(&mut app, "B", 30.0, 40.0);
    assert_eq!(*app.map.creates.last().unwrap(), panned);
}

#[test]
fn test_map_construction_failure_is_fatal() {
    let mut app = RouteApp::new(FakeMap {
        fail_create: true,
        ..FakeMap::default()
    });
    assert_eq!(
        app.start(Viewport::default()),
        Err(MapError::Sdk("service unavailable".to_string()))
    );
}

#[test]
fn test_out_of_order_completions_apply_in_arrival_order() {
    let app = Rc::new(RefCell::new(started()));
    let geocoder = ManualGeocoder::default();

    submit(&app, &geocoder, "A");
    submit(&app, &geocoder, "B");
    // Nothing lands while both requests are in flight
    assert!(app.borrow().store().is_empty());

    // B's response arrives first, so B lands first
    geocoder.resolve("B", GeocodeOutcome::Found(LatLon::new(30.0, 40.0)));
    geocoder.resolve("A", GeocodeOutcome::Found(LatLon::new(10.0, 20.0)));
    assert_eq!(names(&app.borrow()), vec!["B", "A"]);
}

#[test]
fn test_route_feature_needs_two_stops() {
    let mut app = started();
    assert_eq!(app.route_feature(), None);

    add(&mut app, "A", 10.0, 20.0);
    assert_eq!(app.route_feature(), None);

    add(&mut app, "B", 30.0, 40.0);
    let feature: serde_json::Value =
        serde_json::from_str(&app.route_feature().unwrap()).unwrap();
    assert_eq!(feature["geometry"]["type"], "LineString");
    // GeoJSON positions are lon, lat
    assert_eq!(
        feature["geometry"]["coordinates"],
        serde_json::json!([[20.0, 10.0], [40.0, 30.0]])
    );
    assert_eq!(feature["properties"]["stops"], serde_json::json!(["A", "B"]));
}
