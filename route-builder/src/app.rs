use route_builder_store::{LatLon, RouteStore, WaypointId};

use crate::geocode::GeocodeOutcome;
use crate::map::{MapError, MapSurface, Viewport};

pub const NOT_FOUND_NOTICE: &str = "Place not found. Check the name and try again.";

/// Owns the route store, the transient notice and the map surface. Every
/// mutation funnels through here and ends with a full teardown-and-rebuild of
/// the surface at its current zoom/center, so a change never recenters the
/// view. Expected stop counts are tens, not thousands; rebuilding beats
/// diffing at that size.
pub struct RouteApp<M: MapSurface> {
    pub(crate) store: RouteStore,
    pub(crate) map: M,
    pub(crate) notice: Option<String>,
}

impl<M: MapSurface> RouteApp<M> {
    pub fn new(map: M) -> RouteApp<M> {
        RouteApp {
            store: RouteStore::new(),
            map,
            notice: None,
        }
    }

    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// First render. Failure to build the surface here means the map SDK is
    /// unusable; the caller reports it and gives up.
    pub fn start(&mut self, viewport: Viewport) -> Result<(), MapError> {
        self.render_at(viewport)
    }

    /// Applies a finished geocode request for `name`. Returns true when the
    /// list changed, so callers know to rebuild the sidebar.
    pub fn finish_geocode(
        &mut self,
        name: &str,
        outcome: GeocodeOutcome,
    ) -> Result<bool, MapError> {
        match outcome {
            GeocodeOutcome::Found(coords) => {
                self.store.add(name, coords);
                self.redraw()?;
                Ok(true)
            }
            GeocodeOutcome::NotFound => {
                self.notice = Some(NOT_FOUND_NOTICE.to_string());
                Ok(false)
            }
            GeocodeOutcome::Failed(err) => {
                // The request is dropped whole; nothing was added, nothing to
                // undo.
                log::warn!("geocoding {name:?} failed: {err}");
                Ok(false)
            }
        }
    }

    pub fn remove(&mut self, id: WaypointId) -> Result<(), MapError> {
        self.store.remove(id);
        self.redraw()
    }

    pub fn reorder(&mut self, dragged: WaypointId, target: WaypointId) -> Result<(), MapError> {
        self.store.reorder(dragged, target);
        self.redraw()
    }

    /// A marker was dropped at `at`. Only that stop's coordinates change.
    pub fn marker_dragged(&mut self, id: WaypointId, at: LatLon) -> Result<(), MapError> {
        self.store.update_coords(id, at);
        self.redraw()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn redraw(&mut self) -> Result<(), MapError> {
        let viewport = self.map.viewport().unwrap_or_default();
        self.render_at(viewport)
    }

    fn render_at(&mut self, viewport: Viewport) -> Result<(), MapError> {
        self.map.destroy();
        self.map.create(viewport)?;
        for waypt in self.store.waypoints() {
            self.map.add_marker(waypt.id, waypt.coords, &waypt.name)?;
        }
        if self.store.len() > 1 {
            let points: Vec<LatLon> =
                self.store.waypoints().iter().map(|waypt| waypt.coords).collect();
            self.map.add_path(&points)?;
        }
        Ok(())
    }

    /// The built route as a GeoJSON Feature: the connecting line plus the
    /// stop names, in order. None until there are two points to connect.
    pub fn route_feature(&self) -> Option<String> {
        if self.store.len() < 2 {
            return None;
        }
        let line = geojson::Geometry::new(geojson::Value::LineString(
            self.store
                .waypoints()
                .iter()
                .map(|waypt| vec![waypt.coords.lon, waypt.coords.lat])
                .collect(),
        ));
        let mut feature = geojson::Feature {
            bbox: None,
            geometry: Some(line),
            id: None,
            properties: None,
            foreign_members: None,
        };
        let stops: Vec<String> = self
            .store
            .waypoints()
            .iter()
            .map(|waypt| waypt.name.clone())
            .collect();
        feature.set_property("stops", stops);
        Some(serde_json::to_string_pretty(&feature).unwrap())
    }
}
