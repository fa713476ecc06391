//! Wires the core controller and synchronizer to the editor, the provider map and the
//! settings panel, and owns everything that must live for the rest of the page.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use web_sys::HtmlElement;
use wme_gmaps_shared::geo::reproject;
use wme_gmaps_shared::{
    Coordinate, CoordinateTransform, Crs, HostMapView, PositionSynchronizer,
    SettingsStore, SurfaceSlot, Theme, VisibilityController, restyle,
};

use crate::config::{
    Config, LAYER_CHECKBOX_ID, LAYER_GROUP, LAYER_LABEL, SCRIPT_VERSION, SETTINGS_KEY,
    SHORTCUT_DESCRIPTION, SHORTCUT_GROUP, SHORTCUT_ID, SHORTCUT_NAME, TAB_LABEL, TAB_TITLE,
};
use crate::error::InitError;
use crate::gmaps::{self, GoogleOverlay};
use crate::host::{self, HostBindings, OpenLayersTransform, Shortcut, WmeMap};
use crate::surfaces::{self, ContainerSurface, LayerCheckboxSurface};
use crate::{css, panel, storage};

/// Zoom used when the editor has no zoom to offer at startup; the first sync corrects it.
const FALLBACK_ZOOM: u32 = 1;

/// Cloneable handle the settings panel drives the overlay through.
#[derive(Clone)]
pub struct OverlayHandle {
    controller: Rc<VisibilityController>,
    settings: Rc<RefCell<SettingsStore>>,
    map: Rc<GoogleOverlay>,
}

impl OverlayHandle {
    pub fn toggle_visibility(&self) {
        self.controller.set_visible(None);
    }

    pub fn set_feature(&self, id: &str, enabled: bool) {
        let result = self.settings.borrow_mut().set_feature(id, enabled);
        match result {
            Ok(false) => return,
            Ok(true) => tracing::debug!(feature = id, enabled, "feature toggled"),
            Err(e) => tracing::warn!(feature = id, error = %e, "could not persist feature toggle"),
        }
        self.restyle();
    }

    pub fn set_theme(&self, theme: Theme) {
        let result = self.settings.borrow_mut().set_theme(theme);
        match result {
            Ok(false) => return,
            Ok(true) => tracing::debug!(theme = theme.name(), "theme changed"),
            Err(e) => tracing::warn!(theme = theme.name(), error = %e, "could not persist theme"),
        }
        self.restyle();
    }

    fn restyle(&self) {
        restyle(self.map.as_ref(), self.settings.borrow().settings());
    }
}

/// Host callbacks and the panel mount, kept for the life of the page.
struct Retained {
    _bindings: HostBindings,
    _panel: Box<dyn Any>,
}

thread_local! {
    static RETAINED: RefCell<Option<Retained>> = const { RefCell::new(None) };
}

trait Detach {
    fn detach(&self);
}

impl Detach for HtmlElement {
    fn detach(&self) {
        self.remove();
    }
}

/// Takes a placed element out of the page again unless startup gets far enough to
/// `keep` it.
struct Placed<T: Detach>(Option<T>);

impl<T: Detach> Placed<T> {
    fn keep(mut self) {
        self.0 = None;
    }
}

impl<T: Detach> Drop for Placed<T> {
    fn drop(&mut self) {
        if let Some(element) = self.0.take() {
            element.detach();
            tracing::debug!("placed element removed after failed startup");
        }
    }
}

/// Where the overlay map starts: the host position in WGS84, or the origin when the
/// host cannot say yet.
fn initial_view(host: &dyn HostMapView, transform: &dyn CoordinateTransform) -> (Coordinate, u32) {
    let center = host
        .center()
        .map(|c| reproject(transform, c, host.crs(), Crs::Wgs84))
        .filter(Coordinate::is_finite);
    if center.is_none() {
        tracing::warn!("host map has no usable center, starting overlay at the origin");
    }
    (
        center.unwrap_or(Coordinate::new(0.0, 0.0)),
        host.zoom().unwrap_or(FALLBACK_ZOOM),
    )
}

pub async fn bootstrap(config: Config) -> Result<(), InitError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(InitError::NoDocument)?;
    css::inject(&document);

    host::wait_until_ready(config.ready_timeout_ms).await?;
    host::check_capabilities()?;
    if config.debug {
        gmaps::log_provider_script(&document);
    }

    let tab = host::register_sidebar_tab(TAB_TITLE).await?;
    tab.label.set_inner_text(TAB_LABEL);
    host::wait_for_element_connected(&tab.pane).await?;

    let settings = Rc::new(RefCell::new(SettingsStore::load(
        storage::open_backend(),
        SETTINGS_KEY,
    )));
    let saved = settings.borrow().settings().clone();

    let wme = Rc::new(WmeMap::locate()?);
    let transform: Rc<dyn CoordinateTransform> = Rc::new(OpenLayersTransform::locate()?);
    let container = gmaps::create_container(&document, &wme.viewport()?)?;
    let placed = Placed(Some(container.clone()));
    let (center, zoom) = initial_view(wme.as_ref(), transform.as_ref());
    let map = Rc::new(GoogleOverlay::create(container.clone(), center, zoom)?);
    restyle(map.as_ref(), &saved);

    let controller = Rc::new(VisibilityController::new(settings.clone()));
    let synchronizer = Rc::new(PositionSynchronizer::new(controller.state(), transform));
    synchronizer.attach_host(wme);
    synchronizer.attach_overlay(map.clone());
    controller.attach_synchronizer(synchronizer.clone());
    controller.register_surface(SurfaceSlot::Container, Box::new(ContainerSurface(container)));

    let handle = OverlayHandle {
        controller: controller.clone(),
        settings,
        map: map.clone(),
    };
    let switch = RwSignal::new(saved.visible);
    let panel = panel::mount(tab.pane, switch, saved.clone(), handle);
    controller.register_surface(
        SurfaceSlot::PanelSwitch,
        Box::new(move |visible: bool| switch.set(visible)),
    );

    let mut bindings = HostBindings::default();
    {
        let controller = controller.clone();
        bindings.add_layer_checkbox(LAYER_GROUP, LAYER_LABEL, saved.visible, move |checked| {
            controller.set_visible(Some(checked));
        })?;
    }
    controller.register_surface(
        SurfaceSlot::LayerCheckbox,
        Box::new(LayerCheckboxSurface::new(LAYER_CHECKBOX_ID)),
    );
    controller.set_change_callback(surfaces::host_change_notifier(LAYER_CHECKBOX_ID));

    {
        let controller = controller.clone();
        let shortcut = Shortcut {
            name: SHORTCUT_NAME,
            description: SHORTCUT_DESCRIPTION,
            group: SHORTCUT_GROUP,
            id: SHORTCUT_ID,
            combo: &config.shortcut,
        };
        bindings.add_shortcut(&shortcut, move || controller.set_visible(None))?;
    }

    for event in ["moveend", "zoomend"] {
        let synchronizer = synchronizer.clone();
        bindings.on_map_event(event, move || {
            synchronizer.sync_position();
        })?;
    }
    {
        let synchronizer = synchronizer.clone();
        map.on_first_render(move || {
            let outcome = synchronizer.sync_position();
            tracing::debug!(?outcome, "first overlay render");
        });
    }

    placed.keep();
    RETAINED.with(|slot| {
        *slot.borrow_mut() = Some(Retained {
            _bindings: bindings,
            _panel: panel,
        })
    });

    // Pushes the saved value to every surface. The controller already holds it, so this
    // is not a hidden-to-shown transition and the first sync has to be explicit.
    controller.set_visible(Some(saved.visible));
    synchronizer.sync_position();

    tracing::info!(
        version = SCRIPT_VERSION,
        visible = controller.is_visible(),
        theme = saved.theme.name(),
        "overlay ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use wme_gmaps_shared::{Coordinate, Crs, HostMapView};

    use super::{Detach, FALLBACK_ZOOM, Placed, initial_view};

    #[derive(Clone, Default)]
    struct Element(std::rc::Rc<Cell<usize>>);

    impl Detach for Element {
        fn detach(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn failed_startup_detaches_placed_element() {
        let element = Element::default();
        {
            let _placed = Placed(Some(element.clone()));
        }
        assert_eq!(element.0.get(), 1);
    }

    #[test]
    fn kept_element_stays_in_place() {
        let element = Element::default();
        Placed(Some(element.clone())).keep();
        assert_eq!(element.0.get(), 0);
    }

    struct Host {
        center: Option<Coordinate>,
        zoom: Option<u32>,
    }

    impl HostMapView for Host {
        fn center(&self) -> Option<Coordinate> {
            self.center
        }

        fn zoom(&self) -> Option<u32> {
            self.zoom
        }
    }

    #[test]
    fn starts_at_reprojected_host_position() {
        let host = Host {
            center: Some(Coordinate::new(10.0, 20.0)),
            zoom: Some(15),
        };
        let calls = Cell::new(0);
        let transform = |c: Coordinate, from: Crs, to: Crs| {
            assert_eq!((from, to), (Crs::WebMercator, Crs::Wgs84));
            calls.set(calls.get() + 1);
            Coordinate::new(c.x / 10.0, c.y / 10.0)
        };

        let (center, zoom) = initial_view(&host, &transform);

        assert_eq!(center, Coordinate::new(1.0, 2.0));
        assert_eq!(zoom, 15);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn falls_back_when_host_has_no_position() {
        let host = Host {
            center: None,
            zoom: None,
        };
        let transform = |c: Coordinate, _: Crs, _: Crs| c;

        let (center, zoom) = initial_view(&host, &transform);

        assert_eq!(center, Coordinate::new(0.0, 0.0));
        assert_eq!(zoom, FALLBACK_ZOOM);
    }

    #[test]
    fn non_finite_projection_falls_back_to_origin() {
        let host = Host {
            center: Some(Coordinate::new(1.0, 1.0)),
            zoom: Some(3),
        };
        let transform = |_: Coordinate, _: Crs, _: Crs| Coordinate::new(f64::NAN, 0.0);

        let (center, zoom) = initial_view(&host, &transform);

        assert_eq!(center, Coordinate::new(0.0, 0.0));
        assert_eq!(zoom, 3);
    }
}
