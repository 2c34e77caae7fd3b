mod app;
mod ffi;
mod geocode;
mod map;
mod page;
#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use route_builder_store::{LatLon, WaypointId};

use crate::app::RouteApp;
use crate::geocode::SdkGeocoder;
use crate::map::{SdkMap, Viewport};
use crate::page::{Page, PageHandle};

thread_local! {
    static PAGE: RefCell<Option<PageHandle>> = RefCell::new(None);
}

/// Page-supplied overrides for the starting view.
#[derive(Default, Deserialize)]
#[serde(default)]
struct Config {
    center: Option<[f64; 2]>,
    zoom: Option<f64>,
}

#[wasm_bindgen]
pub struct JsRouteBuilder {
    viewport: Viewport,
}

#[wasm_bindgen]
impl JsRouteBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> JsRouteBuilder {
        // Panics shouldn't happen, but if they do, console.log them.
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let mut viewport = Viewport::default();
        match serde_wasm_bindgen::from_value::<Config>(config) {
            Ok(config) => {
                if let Some([lat, lon]) = config.center {
                    viewport.center = LatLon::new(lat, lon);
                }
                if let Some(zoom) = config.zoom {
                    viewport.zoom = zoom;
                }
            }
            Err(err) => {
                log::warn!("bad config, using the default view: {err}");
            }
        }
        JsRouteBuilder { viewport }
    }

    /// Builds the sidebar and the initial, empty map. A map SDK failure here
    /// is fatal; the page gets the error.
    pub fn start(&self) -> Result<(), JsValue> {
        let mut app = RouteApp::new(SdkMap::new());
        app.start(self.viewport).map_err(err_to_js)?;

        let handle: PageHandle = Rc::new(RefCell::new(Page {
            app,
            geocoder: SdkGeocoder,
            dragging: None,
        }));
        page::mount(&handle)?;
        PAGE.with(|cell| *cell.borrow_mut() = Some(handle));
        Ok(())
    }

    /// The built route as a GeoJSON Feature, once there are two stops.
    #[wasm_bindgen(js_name = toRouteFeature)]
    pub fn to_route_feature(&self) -> Option<String> {
        let handle = PAGE.with(|cell| cell.borrow().clone())?;
        let feature = handle.borrow().app.route_feature();
        feature
    }
}

/// Called by the map glue when a marker drag finishes.
#[wasm_bindgen]
pub fn marker_drag_ended(id: u32, lat: f64, lon: f64) {
    let Some(handle) = PAGE.with(|cell| cell.borrow().clone()) else {
        log::warn!("marker drag before the page started");
        return;
    };
    let result = handle
        .borrow_mut()
        .app
        .marker_dragged(WaypointId(id), LatLon::new(lat, lon));
    if let Err(err) = result {
        log::error!("map is unusable after redraw failure: {err}");
    }
}

fn err_to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}
