use std::any::Any;

use leptos::mount::mount_to;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;
use wme_gmaps_shared::{FEATURES, Feature, OverlaySettings, Theme};

use crate::config::{LAYER_LABEL, SCRIPT_NAME, SCRIPT_VERSION};
use crate::overlay::OverlayHandle;

/// Mounts the settings form into the sidebar pane. The returned handle keeps it alive.
pub fn mount(
    pane: HtmlElement,
    visible: RwSignal<bool>,
    settings: OverlaySettings,
    overlay: OverlayHandle,
) -> Box<dyn Any> {
    let handle = mount_to(pane, move || {
        view! { <SettingsForm visible=visible settings=settings overlay=overlay /> }
    });
    Box::new(handle)
}

#[component]
fn SettingsForm(
    visible: RwSignal<bool>,
    settings: OverlaySettings,
    overlay: OverlayHandle,
) -> impl IntoView {
    let theme = settings.theme;
    let rows = FEATURES
        .iter()
        .map(|feature| {
            let checked = settings.feature_enabled(feature);
            view! { <FeatureRow feature=feature checked=checked overlay={overlay.clone()} /> }
        })
        .collect_view();
    view! {
        <form class="settings-form" on:submit=|ev: leptos::ev::SubmitEvent| ev.prevent_default()>
            <ScriptHeader />
            <VisibilitySwitch visible=visible overlay={overlay.clone()} />
            {rows}
            <ThemeSelect theme=theme overlay=overlay />
        </form>
    }
}

#[component]
fn ScriptHeader() -> impl IntoView {
    view! {
        <div class="script-header">
            <span class="script-name">{SCRIPT_NAME}</span>
            <span class="script-version">{format!("v{SCRIPT_VERSION}")}</span>
        </div>
    }
}

/// Mirrors the overlay flag; clicks go through the controller, which then sets `visible`.
#[component]
fn VisibilitySwitch(visible: RwSignal<bool>, overlay: OverlayHandle) -> impl IntoView {
    view! {
        <div class="toggle-container">
            <div
                class="toggle-switch"
                class:on=move || visible.get()
                on:click=move |_| overlay.toggle_visibility()
            >
                <div class="slider" />
            </div>
            <label class="setting-label">{LAYER_LABEL}</label>
        </div>
    }
}

#[component]
fn FeatureRow(feature: &'static Feature, checked: bool, overlay: OverlayHandle) -> impl IntoView {
    let id = feature.id;
    let on_change = move |ev: leptos::ev::Event| {
        overlay.set_feature(id, event_target_checked(&ev));
    };

    view! {
        <div>
            <input
                type="checkbox"
                class="style-input input-space"
                id=id
                prop:checked=checked
                on:change=on_change
            />
            <label class="setting-label" for=id>{feature.label}</label>
            <br />
            {(!feature.description.is_empty())
                .then(|| view! { <span class="description">{feature.description}</span> })}
        </div>
    }
}

#[component]
fn ThemeSelect(theme: Theme, overlay: OverlayHandle) -> impl IntoView {
    let on_change = move |ev: leptos::ev::Event| {
        let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        else {
            return;
        };
        match Theme::from_name(&select.value()) {
            Some(theme) => overlay.set_theme(theme),
            None => tracing::warn!(value = %select.value(), "unknown theme selected"),
        }
    };

    view! {
        <div class="theme-container">
            <label class="setting-label" for="wme-gmaps-theme">"Map Theme"</label>
            <select id="wme-gmaps-theme" class="theme-select" on:change=on_change>
                {Theme::ALL
                    .iter()
                    .map(|&option| {
                        view! {
                            <option value={option.name()} selected={option == theme}>
                                {option.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>
    }
}
