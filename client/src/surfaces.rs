//! Browser-side visibility surfaces.

use wasm_bindgen::JsValue;
use web_sys::{Element, Event, EventInit, HtmlElement};
use wme_gmaps_shared::{ChangeCallback, VisibilitySurface};

use crate::js;

/// Shows or hides the overlay container.
pub struct ContainerSurface(pub HtmlElement);

impl VisibilitySurface for ContainerSurface {
    fn show(&self, visible: bool) {
        let _ = self
            .0
            .style()
            .set_property("display", display_value(visible));
    }
}

fn display_value(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

fn checkbox_value(visible: bool) -> &'static str {
    if visible { "on" } else { "off" }
}

/// Property writes a checkbox-like element accepts. The host renders a `<wz-checkbox>`
/// custom element rather than an `<input>`, so both go through plain properties.
trait CheckboxProperties {
    fn set_checked(&self, checked: bool);
    fn set_value(&self, value: &str);
}

impl CheckboxProperties for Element {
    fn set_checked(&self, checked: bool) {
        js::set(self.as_ref(), "checked", &JsValue::from_bool(checked));
    }

    fn set_value(&self, value: &str) {
        js::set(self.as_ref(), "value", &JsValue::from_str(value));
    }
}

fn mirror(checkbox: &impl CheckboxProperties, visible: bool) {
    checkbox.set_checked(visible);
    checkbox.set_value(checkbox_value(visible));
}

/// The host's layer-switcher checkbox, looked up by id on each update since the host
/// may re-render it.
pub struct LayerCheckboxSurface {
    id: &'static str,
}

impl LayerCheckboxSurface {
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }

    fn element(&self) -> Option<Element> {
        web_sys::window()?.document()?.get_element_by_id(self.id)
    }
}

impl VisibilitySurface for LayerCheckboxSurface {
    fn show(&self, visible: bool) {
        let Some(checkbox) = self.element() else {
            tracing::trace!(id = self.id, "layer checkbox not in the document");
            return;
        };
        mirror(&checkbox, visible);
    }
}

/// Change callback announcing a visibility change to the host by dispatching a
/// bubbling `change` event on its checkbox. Any listener that calls back into the
/// controller does so while it is still applying and is ignored.
pub fn host_change_notifier(id: &'static str) -> ChangeCallback {
    let checkbox = LayerCheckboxSurface::new(id);
    std::rc::Rc::new(move |visible: bool| {
        let Some(element) = checkbox.element() else {
            return;
        };
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict("change", &init) {
            Ok(event) => {
                let _ = element.dispatch_event(&event);
                tracing::trace!(visible, "host checkbox change dispatched");
            }
            Err(e) => tracing::warn!(error = %js::describe(&e), "could not build change event"),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{CheckboxProperties, checkbox_value, display_value, mirror};

    #[derive(Default)]
    struct FakeCheckbox {
        writes: RefCell<Vec<String>>,
    }

    impl CheckboxProperties for FakeCheckbox {
        fn set_checked(&self, checked: bool) {
            self.writes.borrow_mut().push(format!("checked={checked}"));
        }

        fn set_value(&self, value: &str) {
            self.writes.borrow_mut().push(format!("value={value}"));
        }
    }

    #[test]
    fn container_and_checkbox_values() {
        assert_eq!(display_value(true), "block");
        assert_eq!(display_value(false), "none");
        assert_eq!(checkbox_value(true), "on");
        assert_eq!(checkbox_value(false), "off");
    }

    #[test]
    fn mirror_writes_checked_and_value() {
        let checkbox = FakeCheckbox::default();
        mirror(&checkbox, true);
        mirror(&checkbox, false);
        assert_eq!(
            *checkbox.writes.borrow(),
            ["checked=true", "value=on", "checked=false", "value=off"]
        );
    }
}
