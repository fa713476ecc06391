//! Thin dynamic-access helpers for the page globals we do not own (`W`, `WazeWrap`,
//! `OpenLayers`, `google.maps`).

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// `obj[key]`, treating `undefined`/`null` and throwing getters as absent.
pub fn get(obj: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Follows a dotted path of properties, e.g. `["W", "map", "olMap"]`.
pub fn path(root: &JsValue, keys: &[&str]) -> Option<JsValue> {
    keys.iter().try_fold(root.clone(), |obj, key| get(&obj, key))
}

/// Looks a path up from `window`.
pub fn global(keys: &[&str]) -> Option<JsValue> {
    let window = web_sys::window()?;
    path(window.as_ref(), keys)
}

pub fn set(obj: &JsValue, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

/// Calls `obj[method](...args)` with `obj` as `this`.
pub fn call(obj: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let function = get(obj, method)
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("{method} is not a function")))?;
    Reflect::apply(&function, obj, &args.iter().collect::<Array>())
}

/// `new ctor(...args)`.
pub fn construct(ctor: &JsValue, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let ctor = ctor
        .dyn_ref::<Function>()
        .ok_or_else(|| JsValue::from_str("constructor is not a function"))?;
    Reflect::construct(ctor, &args.iter().collect::<Array>())
}

/// Builds a plain object from key/value pairs.
pub fn object(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in entries {
        set(obj.as_ref(), key, value);
    }
    obj.into()
}

pub fn f64_of(obj: &JsValue, key: &str) -> Option<f64> {
    get(obj, key).and_then(|v| v.as_f64())
}

/// Renders a thrown JS value for logs.
pub fn describe(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
