use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::js;

pub const SCRIPT_NAME: &str = "WME GMAPS Layers";
pub const SCRIPT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const SETTINGS_KEY: &str = wme_gmaps_shared::settings::SETTINGS_KEY;

pub const TAB_TITLE: &str = "Gmaps in WME";
pub const TAB_LABEL: &str = "GMAP";

pub const LAYER_GROUP: &str = "display";
pub const LAYER_LABEL: &str = "Google Maps Layers";
/// Id WazeWrap derives for the layer-switcher checkbox from `LAYER_LABEL`.
pub const LAYER_CHECKBOX_ID: &str = "layer-switcher-item_google_maps_layers";

pub const SHORTCUT_NAME: &str = "WMEGoogleMapsLayers";
pub const SHORTCUT_DESCRIPTION: &str = "Toggle Google Maps Layers";
pub const SHORTCUT_GROUP: &str = "layers";
pub const SHORTCUT_ID: &str = "layersToggleWMEGoogleMapsLayers";
pub const DEFAULT_SHORTCUT: &str = "Alt+G";

pub const CONTAINER_ID: &str = "googleMapsDiv";
pub const STYLE_ELEMENT_ID: &str = "wme-gmaps-layers-style";

pub const DEFAULT_READY_TIMEOUT_MS: u32 = 60_000;
/// Largest accepted override; `gloo-timers` takes a `u32` and anything longer is a typo.
const MAX_READY_TIMEOUT_MS: u32 = 10 * 60_000;

/// Page global that may carry runtime overrides.
const OVERRIDE_GLOBAL: &str = "WMEGoogleMapsLayersConfig";

/// Runtime overrides, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Overrides {
    debug: Option<bool>,
    ready_timeout_ms: Option<u32>,
    shortcut: Option<String>,
}

/// Effective configuration for this page load.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub debug: bool,
    pub ready_timeout_ms: u32,
    pub shortcut: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: cfg!(debug_assertions),
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            shortcut: DEFAULT_SHORTCUT.to_string(),
        }
    }
}

impl Config {
    /// Reads `window.WMEGoogleMapsLayersConfig` if present. Malformed overrides are ignored.
    pub fn from_page() -> Self {
        let overrides = js::global(&[OVERRIDE_GLOBAL])
            .and_then(parse_overrides)
            .unwrap_or_default();
        Self::default().merge(overrides)
    }

    fn merge(self, overrides: Overrides) -> Self {
        Self {
            debug: overrides.debug.unwrap_or(self.debug),
            ready_timeout_ms: overrides
                .ready_timeout_ms
                .filter(|ms| (1..=MAX_READY_TIMEOUT_MS).contains(ms))
                .unwrap_or(self.ready_timeout_ms),
            shortcut: overrides
                .shortcut
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(self.shortcut),
        }
    }
}

fn parse_overrides(value: JsValue) -> Option<Overrides> {
    serde_wasm_bindgen::from_value(value).ok()
}
