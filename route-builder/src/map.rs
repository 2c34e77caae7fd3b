use route_builder_store::{LatLon, WaypointId};

use crate::ffi;

/// Where the map starts before the user has built anything.
pub const DEFAULT_CENTER: LatLon = LatLon {
    lat: 55.751574,
    lon: 37.573856,
};
pub const DEFAULT_ZOOM: f64 = 7.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Viewport {
    pub center: LatLon,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum MapError {
    NotReady,
    Sdk(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotReady => write!(f, "map surface is not ready"),
            MapError::Sdk(msg) => write!(f, "map SDK: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

/// The slice of the map SDK the app relies on. The real surface lives behind
/// the JS glue; tests substitute a recording fake.
///
/// Lifecycle is Uninitialized -> Ready on the first `create`, then
/// Ready -> Ready on every redraw, with `destroy` always preceding the next
/// `create`.
pub trait MapSurface {
    fn create(&mut self, viewport: Viewport) -> Result<(), MapError>;
    /// No-op before the first `create`.
    fn destroy(&mut self);
    /// Current zoom/center, or None while uninitialized.
    fn viewport(&self) -> Option<Viewport>;
    fn add_marker(&mut self, id: WaypointId, at: LatLon, hint: &str) -> Result<(), MapError>;
    fn add_path(&mut self, points: &[LatLon]) -> Result<(), MapError>;
}

/// The SDK-backed surface. Holds no copy of any map object, only whether one
/// currently exists on the glue side.
pub struct SdkMap {
    ready: bool,
}

impl SdkMap {
    pub fn new() -> SdkMap {
        SdkMap { ready: false }
    }
}

impl MapSurface for SdkMap {
    fn create(&mut self, viewport: Viewport) -> Result<(), MapError> {
        ffi::map_create(viewport.center.lat, viewport.center.lon, viewport.zoom)
            .map_err(sdk_err)?;
        self.ready = true;
        Ok(())
    }

    fn destroy(&mut self) {
        if self.ready {
            ffi::map_destroy();
            self.ready = false;
        }
    }

    fn viewport(&self) -> Option<Viewport> {
        if !self.ready {
            return None;
        }
        let center = ffi::map_center();
        let &[lat, lon] = &center[..] else {
            // The glue broke its contract; keep running on the default view.
            log::warn!("mapCenter returned {} values, expected 2", center.len());
            return None;
        };
        Some(Viewport {
            center: LatLon::new(lat, lon),
            zoom: ffi::map_zoom(),
        })
    }

    fn add_marker(&mut self, id: WaypointId, at: LatLon, hint: &str) -> Result<(), MapError> {
        if !self.ready {
            return Err(MapError::NotReady);
        }
        ffi::map_add_marker(id.0, at.lat, at.lon, hint).map_err(sdk_err)
    }

    fn add_path(&mut self, points: &[LatLon]) -> Result<(), MapError> {
        if !self.ready {
            return Err(MapError::NotReady);
        }
        let mut coords = Vec::with_capacity(points.len() * 2);
        for pt in points {
            coords.push(pt.lat);
            coords.push(pt.lon);
        }
        ffi::map_add_path(&coords).map_err(sdk_err)
    }
}

fn sdk_err(err: wasm_bindgen::JsValue) -> MapError {
    MapError::Sdk(format!("{err:?}"))
}
