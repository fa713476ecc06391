//! Waze Map Editor side: the `W` editor API, the WazeWrap helper library and the
//! OpenLayers projection code the editor ships with.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AddEventListenerOptions, HtmlElement};
use wme_gmaps_shared::{Coordinate, CoordinateTransform, Crs, HostMapView};

use crate::error::InitError;
use crate::js;

const READY_EVENT: &str = "wme-ready";

fn is_ready() -> bool {
    js::global(&["W", "userscripts", "state", "isReady"])
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

/// Resolves once the editor reports readiness, either already or via the one-shot
/// `wme-ready` document event. Gives up after `timeout_ms`.
pub async fn wait_until_ready(timeout_ms: u32) -> Result<(), InitError> {
    if is_ready() {
        return Ok(());
    }
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(InitError::NoDocument)?;

    let (tx, rx) = futures::channel::oneshot::channel::<()>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(());
        }
    });

    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
        READY_EVENT,
        listener.as_ref().unchecked_ref(),
        &options,
    );
    tracing::debug!(timeout_ms, "waiting for {READY_EVENT}");

    let outcome = select(rx, TimeoutFuture::new(timeout_ms)).await;
    let _ = document
        .remove_event_listener_with_callback(READY_EVENT, listener.as_ref().unchecked_ref());
    drop(listener);

    match outcome {
        Either::Left((Ok(()), _)) => Ok(()),
        // The sender lives in the listener, so a cancel only happens once it is dropped.
        Either::Left((Err(_), _)) | Either::Right(_) => Err(InitError::ReadyTimeout(timeout_ms)),
    }
}

/// Page globals the overlay cannot work without, by display name and property path.
const REQUIRED_CAPABILITIES: &[(&str, &[&str])] = &[
    ("W.userscripts", &["W", "userscripts"]),
    ("W.map", &["W", "map"]),
    ("WazeWrap.Events", &["WazeWrap", "Events"]),
    ("WazeWrap.Interface.AddLayerCheckbox", &["WazeWrap", "Interface", "AddLayerCheckbox"]),
    ("WazeWrap.Interface.Shortcut", &["WazeWrap", "Interface", "Shortcut"]),
    ("OpenLayers.LonLat", &["OpenLayers", "LonLat"]),
    ("OpenLayers.Projection", &["OpenLayers", "Projection"]),
    ("google.maps", &["google", "maps"]),
];

fn first_missing(is_present: impl Fn(&[&str]) -> bool) -> Option<&'static str> {
    REQUIRED_CAPABILITIES
        .iter()
        .find(|(_, keys)| !is_present(*keys))
        .map(|(name, _)| *name)
}

/// Fails with the first page global the overlay cannot work without.
pub fn check_capabilities() -> Result<(), InitError> {
    match first_missing(|keys| js::global(keys).is_some()) {
        Some(name) => Err(InitError::MissingCapability(name)),
        None => Ok(()),
    }
}

/// Sidebar tab handles returned by `W.userscripts.registerSidebarTab`.
pub struct SidebarTab {
    pub label: HtmlElement,
    pub pane: HtmlElement,
}

pub async fn register_sidebar_tab(title: &str) -> Result<SidebarTab, InitError> {
    let userscripts = js::global(&["W", "userscripts"])
        .ok_or(InitError::MissingCapability("W.userscripts"))?;
    let mut result = js::call(
        &userscripts,
        "registerSidebarTab",
        &[JsValue::from_str(title)],
    )
    .map_err(|e| InitError::TabRegistration(js::describe(&e)))?;

    // Older editor builds hand back a promise.
    if let Ok(promise) = result.clone().dyn_into::<js_sys::Promise>() {
        result = JsFuture::from(promise)
            .await
            .map_err(|e| InitError::TabRegistration(js::describe(&e)))?;
    }

    let element = |key: &str| {
        js::get(&result, key)
            .and_then(|v| v.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| InitError::TabRegistration(format!("result has no {key} element")))
    };
    Ok(SidebarTab {
        label: element("tabLabel")?,
        pane: element("tabPane")?,
    })
}

pub async fn wait_for_element_connected(pane: &HtmlElement) -> Result<(), InitError> {
    let userscripts = js::global(&["W", "userscripts"])
        .ok_or(InitError::MissingCapability("W.userscripts"))?;
    let promise = js::call(&userscripts, "waitForElementConnected", &[pane.clone().into()])
        .map_err(|e| InitError::PaneDetached(js::describe(&e)))?
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| InitError::PaneDetached("did not return a promise".to_string()))?;
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| InitError::PaneDetached(js::describe(&e)))
}

/// The editor's map (`W.map`).
pub struct WmeMap {
    map: JsValue,
}

impl WmeMap {
    pub fn locate() -> Result<Self, InitError> {
        js::global(&["W", "map"])
            .map(|map| Self { map })
            .ok_or(InitError::MissingCapability("W.map"))
    }

    /// DOM element the overlay container is appended to.
    pub fn viewport(&self) -> Result<HtmlElement, InitError> {
        let ol_map = js::get(&self.map, "olMap")
            .ok_or(InitError::MissingCapability("W.map.olMap"))?;
        js::call(&ol_map, "getViewport", &[])
            .ok()
            .and_then(|v| v.dyn_into::<HtmlElement>().ok())
            .ok_or(InitError::MissingCapability("W.map.olMap.getViewport"))
    }
}

impl HostMapView for WmeMap {
    fn center(&self) -> Option<Coordinate> {
        let center = js::call(&self.map, "getCenter", &[]).ok()?;
        Some(Coordinate::new(
            js::f64_of(&center, "lon")?,
            js::f64_of(&center, "lat")?,
        ))
    }

    fn zoom(&self) -> Option<u32> {
        let zoom = js::call(&self.map, "getZoom", &[]).ok()?.as_f64()?;
        (zoom.is_finite() && zoom >= 0.0).then(|| zoom.round() as u32)
    }
}

/// Projection through the editor's bundled OpenLayers (`LonLat#transform`).
pub struct OpenLayersTransform {
    lon_lat: JsValue,
    projection: JsValue,
}

impl OpenLayersTransform {
    pub fn locate() -> Result<Self, InitError> {
        let lon_lat = js::global(&["OpenLayers", "LonLat"])
            .ok_or(InitError::MissingCapability("OpenLayers.LonLat"))?;
        let projection = js::global(&["OpenLayers", "Projection"])
            .ok_or(InitError::MissingCapability("OpenLayers.Projection"))?;
        Ok(Self {
            lon_lat,
            projection,
        })
    }

    fn try_transform(&self, coord: Coordinate, from: Crs, to: Crs) -> Result<Coordinate, JsValue> {
        let point = js::construct(&self.lon_lat, &[coord.x.into(), coord.y.into()])?;
        let from = js::construct(&self.projection, &[JsValue::from_str(from.code())])?;
        let to = js::construct(&self.projection, &[JsValue::from_str(to.code())])?;
        // Mutates in place and returns itself.
        let point = js::call(&point, "transform", &[from, to])?;
        match (js::f64_of(&point, "lon"), js::f64_of(&point, "lat")) {
            (Some(lon), Some(lat)) => Ok(Coordinate::new(lon, lat)),
            _ => Err(JsValue::from_str("transform returned no lon/lat")),
        }
    }
}

impl CoordinateTransform for OpenLayersTransform {
    fn transform(&self, coord: Coordinate, from: Crs, to: Crs) -> Coordinate {
        self.try_transform(coord, from, to).unwrap_or_else(|e| {
            tracing::warn!(error = %js::describe(&e), "coordinate transform failed");
            Coordinate::new(f64::NAN, f64::NAN)
        })
    }
}

/// Callbacks handed to the host. They must outlive the page, so they are owned here.
#[derive(Default)]
pub struct HostBindings {
    callbacks: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl HostBindings {
    fn keep(&mut self, closure: Closure<dyn FnMut(JsValue)>) -> JsValue {
        let function = closure.as_ref().clone();
        self.callbacks.push(closure);
        function
    }

    /// `WazeWrap.Events.register(event, null, handler)`.
    pub fn on_map_event(
        &mut self,
        event: &str,
        handler: impl FnMut() + 'static,
    ) -> Result<(), InitError> {
        let mut handler = handler;
        let function = self.keep(Closure::new(move |_: JsValue| handler()));
        js::global(&["WazeWrap", "Events"])
            .ok_or(InitError::MissingCapability("WazeWrap.Events"))
            .and_then(|events| {
                js::call(
                    &events,
                    "register",
                    &[JsValue::from_str(event), JsValue::NULL, function],
                )
                .map_err(|e| InitError::HostBinding(format!("{event}: {}", js::describe(&e))))
            })?;
        tracing::debug!(event, "subscribed to host map event");
        Ok(())
    }

    /// Host layer-switcher checkbox; `on_change` receives the checked state.
    pub fn add_layer_checkbox(
        &mut self,
        group: &str,
        label: &str,
        checked: bool,
        on_change: impl Fn(bool) + 'static,
    ) -> Result<(), InitError> {
        let function = self.keep(Closure::new(move |checked: JsValue| {
            on_change(checked.as_bool().unwrap_or(false));
        }));
        let interface = js::global(&["WazeWrap", "Interface"])
            .ok_or(InitError::MissingCapability("WazeWrap.Interface"))?;
        js::call(
            &interface,
            "AddLayerCheckbox",
            &[
                JsValue::from_str(group),
                JsValue::from_str(label),
                JsValue::from_bool(checked),
                function,
                JsValue::NULL,
            ],
        )
        .map_err(|e| InitError::HostBinding(format!("layer checkbox: {}", js::describe(&e))))?;
        Ok(())
    }

    /// `new WazeWrap.Interface.Shortcut(...).add()`.
    pub fn add_shortcut(
        &mut self,
        shortcut: &Shortcut<'_>,
        on_press: impl Fn() + 'static,
    ) -> Result<(), InitError> {
        let function = self.keep(Closure::new(move |_: JsValue| on_press()));
        let ctor = js::global(&["WazeWrap", "Interface", "Shortcut"])
            .ok_or(InitError::MissingCapability("WazeWrap.Interface.Shortcut"))?;
        js::construct(
            &ctor,
            &[
                JsValue::from_str(shortcut.name),
                JsValue::from_str(shortcut.description),
                JsValue::from_str(shortcut.group),
                JsValue::from_str(shortcut.id),
                JsValue::from_str(shortcut.combo),
                function,
                JsValue::NULL,
            ],
        )
        .and_then(|instance| js::call(&instance, "add", &[]))
        .map_err(|e| InitError::HostBinding(format!("shortcut: {}", js::describe(&e))))?;
        tracing::debug!(combo = shortcut.combo, "keyboard shortcut registered");
        Ok(())
    }
}

pub struct Shortcut<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub group: &'a str,
    pub id: &'a str,
    pub combo: &'a str,
}
