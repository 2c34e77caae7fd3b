use route_builder_store::LatLon;

use crate::ffi;

/// What a single geocoding request resolved to.
#[derive(Clone, PartialEq, Debug)]
pub enum GeocodeOutcome {
    /// The first (and only requested) candidate.
    Found(LatLon),
    NotFound,
    /// Transport or service failure. The request is dropped; see `RouteApp`.
    Failed(String),
}

/// Free text in, at most one candidate out, delivered asynchronously on the
/// UI thread. Requests are not sequenced and cannot be cancelled, so two
/// in-flight lookups can complete in either order; outcomes apply as they
/// arrive.
pub trait Geocoder {
    fn geocode(&self, query: &str, done: Box<dyn FnOnce(GeocodeOutcome)>);
}

/// Geocoder backed by the SDK glue.
#[derive(Clone, Copy)]
pub struct SdkGeocoder;

impl Geocoder for SdkGeocoder {
    fn geocode(&self, query: &str, done: Box<dyn FnOnce(GeocodeOutcome)>) {
        let query = query.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            done(resolve(&query).await);
        });
    }
}

async fn resolve(query: &str) -> GeocodeOutcome {
    let promise = ffi::sdk_geocode(query);
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(value) => {
            if value.is_null() || value.is_undefined() {
                return GeocodeOutcome::NotFound;
            }
            match serde_wasm_bindgen::from_value::<[f64; 2]>(value) {
                Ok([lat, lon]) => GeocodeOutcome::Found(LatLon::new(lat, lon)),
                Err(err) => GeocodeOutcome::Failed(format!("bad geocode result: {err}")),
            }
        }
        Err(err) => GeocodeOutcome::Failed(format!("{err:?}")),
    }
}
