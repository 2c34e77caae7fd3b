//! The sidebar: heading, the add-a-stop form, the draggable list of places
//! and the transient notice. All of it is rebuilt from the store after every
//! change, same as the map surface.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, DragEvent, Element, Event, HtmlInputElement};

use route_builder_store::WaypointId;

use crate::app::RouteApp;
use crate::geocode::{Geocoder, SdkGeocoder};
use crate::map::SdkMap;

pub const NOTICE_DISMISS_MS: u32 = 2_000;

const SIDEBAR_ID: &str = "route-sidebar";
const INPUT_ID: &str = "route-input";
const PLACES_ID: &str = "route-places";
const NOTICE_ID: &str = "route-notice";

/// Everything the event closures share.
pub struct Page {
    pub app: RouteApp<SdkMap>,
    pub geocoder: SdkGeocoder,
    pub dragging: Option<WaypointId>,
}

pub type PageHandle = Rc<RefCell<Page>>;

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|win| win.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn by_id(doc: &Document, id: &str) -> Result<Element, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

/// Builds the sidebar into `#route-sidebar` and wires the form.
pub fn mount(handle: &PageHandle) -> Result<(), JsValue> {
    let doc = document()?;
    let sidebar = by_id(&doc, SIDEBAR_ID)?;
    sidebar.set_inner_html("");

    let title = doc.create_element("h1")?;
    title.set_text_content(Some("Your route:"));
    sidebar.append_child(&title)?;

    let form = doc.create_element("form")?;
    let input = doc.create_element("input")?;
    input.set_attribute("id", INPUT_ID)?;
    input.set_attribute("type", "text")?;
    input.set_attribute("placeholder", "Add a stop")?;
    input.set_attribute("autofocus", "")?;
    form.append_child(&input)?;
    sidebar.append_child(&form)?;

    let places = doc.create_element("ul")?;
    places.set_attribute("id", PLACES_ID)?;
    sidebar.append_child(&places)?;

    let notice = doc.create_element("div")?;
    notice.set_attribute("id", NOTICE_ID)?;
    notice.set_attribute("hidden", "")?;
    sidebar.append_child(&notice)?;

    // Listeners on elements the page rebuilds die with the element, so
    // forget() is safe; this one lives for the whole session.
    let submit = {
        let handle = handle.clone();
        Closure::wrap(Box::new(move |event: Event| {
            event.prevent_default();
            if let Err(err) = on_submit(&handle) {
                web_sys::console::error_1(&err);
            }
        }) as Box<dyn FnMut(Event)>)
    };
    form.add_event_listener_with_callback("submit", submit.as_ref().unchecked_ref())?;
    submit.forget();

    render_places(handle)
}

/// Submit-on-enter: clear the input right away, then geocode. The form stays
/// enabled while the lookup is pending, so rapid submissions can overlap.
fn on_submit(handle: &PageHandle) -> Result<(), JsValue> {
    let doc = document()?;
    let input: HtmlInputElement = by_id(&doc, INPUT_ID)?.dyn_into()?;
    let text = input.value().trim().to_string();
    input.set_value("");
    if text.is_empty() {
        return Ok(());
    }

    let geocoder = handle.borrow().geocoder;
    let handle = handle.clone();
    let query = text.clone();
    geocoder.geocode(
        &query,
        Box::new(move |outcome| {
            let changed = match handle.borrow_mut().app.finish_geocode(&text, outcome) {
                Ok(changed) => changed,
                Err(err) => {
                    log::error!("map is unusable after redraw failure: {err}");
                    return;
                }
            };
            if changed {
                if let Err(err) = render_places(&handle) {
                    web_sys::console::error_1(&err);
                }
            }
            if let Err(err) = sync_notice(&handle) {
                web_sys::console::error_1(&err);
            }
        }),
    );
    Ok(())
}

/// Rebuilds the list of places from the store.
fn render_places(handle: &PageHandle) -> Result<(), JsValue> {
    let doc = document()?;
    let places = by_id(&doc, PLACES_ID)?;
    places.set_inner_html("");

    let stops: Vec<(WaypointId, String)> = handle
        .borrow()
        .app
        .store()
        .waypoints()
        .iter()
        .map(|waypt| (waypt.id, waypt.name.clone()))
        .collect();

    for (id, name) in stops {
        let item = doc.create_element("li")?;
        item.set_attribute("draggable", "true")?;

        let label = doc.create_element("p")?;
        label.set_text_content(Some(&name));
        item.append_child(&label)?;

        let delete = doc.create_element("button")?;
        delete.set_attribute("type", "button")?;
        delete.set_text_content(Some("\u{00d7}"));
        item.append_child(&delete)?;

        {
            let handle = handle.clone();
            let closure = Closure::wrap(Box::new(move |event: DragEvent| {
                handle.borrow_mut().dragging = Some(id);
                // Firefox ignores the drag without setData
                if let Some(dt) = event.data_transfer() {
                    dt.set_effect_allowed("move");
                    let _ = dt.set_data("text/plain", &id.0.to_string());
                }
            }) as Box<dyn FnMut(DragEvent)>);
            item.add_event_listener_with_callback("dragstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::wrap(Box::new(move |event: DragEvent| {
                event.prevent_default();
            }) as Box<dyn FnMut(DragEvent)>);
            item.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let handle = handle.clone();
            let closure = Closure::wrap(Box::new(move |event: DragEvent| {
                event.prevent_default();
                let dragged = handle.borrow_mut().dragging.take();
                let Some(dragged) = dragged else {
                    return;
                };
                if let Err(err) = handle.borrow_mut().app.reorder(dragged, id) {
                    log::error!("map is unusable after redraw failure: {err}");
                }
                if let Err(err) = render_places(&handle) {
                    web_sys::console::error_1(&err);
                }
            }) as Box<dyn FnMut(DragEvent)>);
            item.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let handle = handle.clone();
            let closure = Closure::wrap(Box::new(move |_event: Event| {
                if let Err(err) = handle.borrow_mut().app.remove(id) {
                    log::error!("map is unusable after redraw failure: {err}");
                }
                if let Err(err) = render_places(&handle) {
                    web_sys::console::error_1(&err);
                }
            }) as Box<dyn FnMut(Event)>);
            delete.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        places.append_child(&item)?;
    }
    Ok(())
}

/// Shows or hides the notice banner. Each shown notice schedules its own
/// dismissal; an earlier timer can clear a newer notice a little early.
fn sync_notice(handle: &PageHandle) -> Result<(), JsValue> {
    let doc = document()?;
    let notice = by_id(&doc, NOTICE_ID)?;
    let message = handle.borrow().app.notice().map(str::to_string);
    match message {
        Some(message) => {
            notice.set_text_content(Some(&message));
            notice.remove_attribute("hidden")?;
            let handle = handle.clone();
            Timeout::new(NOTICE_DISMISS_MS, move || {
                handle.borrow_mut().app.clear_notice();
                if let Err(err) = sync_notice(&handle) {
                    web_sys::console::error_1(&err);
                }
            })
            .forget();
        }
        None => {
            notice.set_text_content(None);
            notice.set_attribute("hidden", "")?;
        }
    }
    Ok(())
}
