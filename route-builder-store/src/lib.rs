use serde::{Deserialize, Serialize};

/// A geographic position, latitude first, matching what the map SDK reports.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> LatLon {
        LatLon { lat, lon }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct WaypointId(pub u32);

/// One named, geolocated stop on the route.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Waypoint {
    pub id: WaypointId,
    pub name: String,
    pub coords: LatLon,
    /// Display rank. Not necessarily contiguous; removals leave gaps.
    pub order: u32,
}

/// The ordered list of stops, and the single source of truth for it. The map
/// and the sidebar are always rebuilt from here, never the other way around.
#[derive(Default)]
pub struct RouteStore {
    waypoints: Vec<Waypoint>,
    next_id: u32,
}

impl RouteStore {
    pub fn new() -> RouteStore {
        RouteStore::default()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Appends a stop. Ids come from a counter and are never reused within a
    /// session, so they stay unique no matter how the list churns.
    pub fn add(&mut self, name: &str, coords: LatLon) -> WaypointId {
        self.next_id += 1;
        let id = WaypointId(self.next_id);
        self.waypoints.push(Waypoint {
            id,
            name: name.to_string(),
            coords,
            order: self.waypoints.len() as u32 + 1,
        });
        id
    }

    /// Removing an id that's already gone is a no-op, not an error.
    pub fn remove(&mut self, id: WaypointId) {
        self.waypoints.retain(|waypt| waypt.id != id);
    }

    /// Replaces the coordinates of the matching stop in place, leaving every
    /// other field alone. No-op when the id is gone.
    pub fn update_coords(&mut self, id: WaypointId, coords: LatLon) {
        if let Some(waypt) = self.waypoints.iter_mut().find(|waypt| waypt.id == id) {
            waypt.coords = coords;
        }
    }

    /// Swaps the ranks of the dragged and target stops, then restores the
    /// list to ascending rank. The sort is stable, so stops that happen to
    /// share a rank keep their current relative position.
    pub fn reorder(&mut self, dragged: WaypointId, target: WaypointId) {
        if dragged == target {
            return;
        }
        let Some(a) = self.waypoints.iter().position(|waypt| waypt.id == dragged) else {
            return;
        };
        let Some(b) = self.waypoints.iter().position(|waypt| waypt.id == target) else {
            return;
        };
        let tmp = self.waypoints[a].order;
        self.waypoints[a].order = self.waypoints[b].order;
        self.waypoints[b].order = tmp;
        self.waypoints.sort_by_key(|waypt| waypt.order);
    }
}
