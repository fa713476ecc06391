//! Google Maps side of the overlay: the map instance, its traffic layer and the
//! container element it renders into.

use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};
use wme_gmaps_shared::style::StyleRule;
use wme_gmaps_shared::{Coordinate, OverlayMapView};

use crate::config::CONTAINER_ID;
use crate::error::InitError;
use crate::js;

const API_HOST: &str = "maps.googleapis.com";
/// Fully transparent tile background so the editor map shows through.
const TRANSPARENT_BACKGROUND: &str = "rgb(229 227 223 / 0%)";

/// Absolutely positioned `<div>` filling the host viewport.
pub fn create_container(document: &Document, viewport: &HtmlElement) -> Result<HtmlElement, InitError> {
    let container = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| InitError::MapCreation("could not create container element".into()))?;
    container.set_id(CONTAINER_ID);
    let style = container.style();
    for (property, value) in [
        ("position", "absolute"),
        ("top", "0"),
        ("left", "0"),
        ("right", "0"),
        ("bottom", "0"),
        ("pointer-events", "none"),
    ] {
        let _ = style.set_property(property, value);
    }
    viewport
        .append_child(&container)
        .map_err(|e| InitError::MapCreation(js::describe(&e)))?;
    Ok(container)
}

/// The provider map plus its traffic layer.
pub struct GoogleOverlay {
    maps: JsValue,
    map: JsValue,
    traffic: JsValue,
    container: HtmlElement,
}

impl GoogleOverlay {
    /// `center` is WGS84 (`x` = longitude, `y` = latitude).
    pub fn create(container: HtmlElement, center: Coordinate, zoom: u32) -> Result<Self, InitError> {
        let maps = js::global(&["google", "maps"])
            .ok_or(InitError::MissingCapability("google.maps"))?;
        let map_ctor = js::get(&maps, "Map")
            .ok_or(InitError::MissingCapability("google.maps.Map"))?;
        let traffic_ctor = js::get(&maps, "TrafficLayer")
            .ok_or(InitError::MissingCapability("google.maps.TrafficLayer"))?;

        let options = js::object(&[
            ("zoom", JsValue::from(zoom)),
            ("center", lat_lng_literal(center)),
            ("disableDefaultUI", JsValue::TRUE),
        ]);
        let map = js::construct(&map_ctor, &[container.clone().into(), options])
            .map_err(|e| InitError::MapCreation(js::describe(&e)))?;
        let traffic = js::construct(&traffic_ctor, &[])
            .map_err(|e| InitError::MapCreation(js::describe(&e)))?;

        tracing::info!(lat = center.y, lng = center.x, zoom, "overlay map created");
        Ok(Self {
            maps,
            map,
            traffic,
            container,
        })
    }

    /// Runs `callback` once, after the first batch of tiles has rendered.
    pub fn on_first_render(&self, callback: impl FnOnce() + 'static) {
        let closure = Closure::once_into_js(callback);
        let registered = js::path(&self.maps, &["event"]).map(|event| {
            js::call(
                &event,
                "addListenerOnce",
                &[self.map.clone(), JsValue::from_str("tilesloaded"), closure],
            )
        });
        if !matches!(registered, Some(Ok(_))) {
            tracing::warn!("could not listen for the first overlay render");
        }
    }

    /// Keeps the overlay click-through and its background transparent.
    fn make_transparent(&self) {
        let _ = self.container.style().set_property("pointer-events", "none");
        if let Some(inner) = self
            .container
            .first_element_child()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = inner
                .style()
                .set_property("background-color", TRANSPARENT_BACKGROUND);
        }
    }
}

fn lat_lng_literal(center: Coordinate) -> JsValue {
    js::object(&[
        ("lat", JsValue::from_f64(center.y)),
        ("lng", JsValue::from_f64(center.x)),
    ])
}

impl OverlayMapView for GoogleOverlay {
    fn pan_to(&self, center: Coordinate) {
        if let Err(e) = js::call(&self.map, "panTo", &[lat_lng_literal(center)]) {
            tracing::warn!(error = %js::describe(&e), "overlay panTo failed");
        }
    }

    fn set_zoom(&self, zoom: u32) {
        if let Err(e) = js::call(&self.map, "setZoom", &[JsValue::from(zoom)]) {
            tracing::warn!(error = %js::describe(&e), "overlay setZoom failed");
        }
    }

    fn set_styles(&self, rules: &[StyleRule]) {
        // Plain objects and arrays; the default serializer would emit Maps.
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let styles = match rules.serialize(&serializer) {
            Ok(styles) => styles,
            Err(e) => {
                tracing::error!(error = %e, "could not encode overlay styles");
                return;
            }
        };
        if let Err(e) = js::call(&self.map, "setOptions", &[js::object(&[("styles", styles)])]) {
            tracing::warn!(error = %js::describe(&e), "overlay setOptions failed");
        }
        self.make_transparent();
    }

    fn set_traffic_visible(&self, visible: bool) {
        let target = if visible { self.map.clone() } else { JsValue::NULL };
        if let Err(e) = js::call(&self.traffic, "setMap", &[target]) {
            tracing::warn!(error = %js::describe(&e), "traffic layer setMap failed");
        }
        self.make_transparent();
    }
}

/// Debug aid: logs the provider script URL the page loaded, with its API key redacted.
pub fn log_provider_script(document: &Document) {
    let Ok(scripts) = document.query_selector_all("script[src]") else {
        return;
    };
    for index in 0..scripts.length() {
        let Some(script) = scripts
            .item(index)
            .and_then(|node| node.dyn_into::<web_sys::HtmlScriptElement>().ok())
        else {
            continue;
        };
        let src = script.src();
        if src.contains(API_HOST) {
            tracing::debug!(url = %redact_key(&src), has_key = has_key(&src), "provider script");
        }
    }
}

fn has_key(src: &str) -> bool {
    web_sys::Url::new(src)
        .map(|url| url.search_params().get("key").is_some())
        .unwrap_or(false)
}

/// Replaces the `key` query value with `REDACTED`.
fn redact_key(src: &str) -> String {
    let Some((base, query)) = src.split_once('?') else {
        return src.to_string();
    };
    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("key", _)) => "key=REDACTED".to_string(),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

#[cfg(test)]
mod tests {
    use super::redact_key;

    #[test]
    fn key_is_redacted() {
        assert_eq!(
            redact_key("https://maps.googleapis.com/maps/api/js?v=3&key=abc123&libraries=x"),
            "https://maps.googleapis.com/maps/api/js?v=3&key=REDACTED&libraries=x"
        );
    }

    #[test]
    fn url_without_query_is_unchanged() {
        let url = "https://maps.googleapis.com/maps/api/js";
        assert_eq!(redact_key(url), url);
    }
}
