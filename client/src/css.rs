use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlStyleElement};

use crate::config::STYLE_ELEMENT_ID;

const PANEL_CSS: &str = r#"
.input-space {
    margin-right: 10px;
}
.description {
    display: block;
    font-size: 0.9em;
    color: #666;
    margin-left: 18px;
    margin-bottom: 1px;
}
.setting-label {
    font-family: Arial, sans-serif;
    font-weight: bold;
    font-size: 1.0em;
    color: #333;
    background-color: transparent;
    padding: 2px;
    border-radius: 5px;
    margin-bottom: 2px;
    display: inline-block;
}
.settings-form {
    margin: 5px;
    padding: 10px;
    background-color: transparent;
    border: 2px solid #ddd;
    border-radius: 10px;
    box-shadow: 2px 2px 10px rgba(0,0,0,0.1);
}
.script-header {
    text-align: center;
    margin-bottom: 10px;
}
.script-name {
    font-size: 1.0em;
    font-weight: bold;
    color: #222;
    display: block;
}
.script-version {
    font-size: 1em;
    color: #555;
    display: block;
}
.toggle-container {
    display: flex;
    align-items: center;
    margin-bottom: 10px;
}
.toggle-switch {
    position: relative;
    width: 50px;
    height: 20px;
    background: #ccc;
    border-radius: 20px;
    cursor: pointer;
    margin-right: 10px;
    transition: background 0.3s;
}
.toggle-switch.on {
    background: #4CAF50;
}
.toggle-switch .slider {
    position: absolute;
    width: 15px;
    height: 15px;
    background: white;
    border-radius: 50%;
    top: 2px;
    left: 2px;
    transition: all 0.3s;
}
.toggle-switch.on .slider {
    left: 30px;
}
.theme-container {
    margin-top: 10px;
}
.theme-select {
    display: block;
    width: 100%;
    margin-top: 4px;
    padding: 3px;
    border: 1px solid #ccc;
    border-radius: 5px;
}
"#;

/// Appends the panel stylesheet to `<head>` once per page.
pub fn inject(document: &Document) {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return;
    }
    let Some(head) = document.head() else {
        tracing::warn!("document has no <head>, panel styles not injected");
        return;
    };
    let Some(style) = document
        .create_element("style")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlStyleElement>().ok())
    else {
        return;
    };
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(PANEL_CSS));
    if head.append_child(&style).is_err() {
        tracing::warn!("could not append panel styles");
    }
}
