//! Bindings to the map SDK glue. Just wrappers, no state or logic on this
//! side of the boundary.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Builds a fresh map surface in the page's map container.
    #[wasm_bindgen(catch, js_name = mapCreate)]
    pub fn map_create(lat: f64, lon: f64, zoom: f64) -> Result<(), JsValue>;

    /// Tears the current surface down. Safe to call without one.
    #[wasm_bindgen(js_name = mapDestroy)]
    pub fn map_destroy();

    #[wasm_bindgen(js_name = mapZoom)]
    pub fn map_zoom() -> f64;

    /// Current center as `[lat, lon]`.
    #[wasm_bindgen(js_name = mapCenter)]
    pub fn map_center() -> Box<[f64]>;

    /// Places a draggable marker. When a drag finishes, the glue calls the
    /// exported `marker_drag_ended(id, lat, lon)`.
    #[wasm_bindgen(catch, js_name = mapAddMarker)]
    pub fn map_add_marker(id: u32, lat: f64, lon: f64, hint: &str) -> Result<(), JsValue>;

    /// Draws the connecting line. `coords` is flattened `lat, lon` pairs.
    #[wasm_bindgen(catch, js_name = mapAddPath)]
    pub fn map_add_path(coords: &[f64]) -> Result<(), JsValue>;

    /// Resolves free text to at most one `[lat, lon]` candidate, or null.
    #[wasm_bindgen(js_name = sdkGeocode)]
    pub fn sdk_geocode(query: &str) -> js_sys::Promise;
}
