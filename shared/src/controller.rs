use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::settings::SettingsStore;
use crate::sync::PositionSynchronizer;

/// Shared, single-threaded handle to the "overlay shown" flag.
///
/// Readable by anyone holding a clone; only `VisibilityController` writes it.
#[derive(Debug, Clone, Default)]
pub struct OverlayState(Rc<Cell<bool>>);

impl OverlayState {
    pub fn new(visible: bool) -> Self {
        Self(Rc::new(Cell::new(visible)))
    }

    pub fn is_visible(&self) -> bool {
        self.0.get()
    }

    fn set(&self, visible: bool) {
        self.0.set(visible);
    }
}

/// A UI element mirroring the visibility flag in its own representation.
///
/// Implementations must tolerate their backing element being gone and skip silently.
pub trait VisibilitySurface {
    fn show(&self, visible: bool);
}

impl<F: Fn(bool)> VisibilitySurface for F {
    fn show(&self, visible: bool) {
        self(visible)
    }
}

/// Which registry slot a surface occupies. Registering into a taken slot replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SurfaceSlot {
    PanelSwitch,
    LayerCheckbox,
    Container,
}

pub type ChangeCallback = Rc<dyn Fn(bool)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    Idle,
    Applying,
}

/// Holds `Applying` for its lifetime.
struct Applying<'a>(&'a Cell<GuardState>);

impl<'a> Applying<'a> {
    fn enter(guard: &'a Cell<GuardState>) -> Option<Self> {
        if guard.get() == GuardState::Applying {
            return None;
        }
        guard.set(GuardState::Applying);
        Some(Self(guard))
    }
}

impl Drop for Applying<'_> {
    fn drop(&mut self) {
        self.0.set(GuardState::Idle);
    }
}

/// Single write path for overlay visibility.
///
/// Every UI-originated change (panel switch, host layer checkbox, shortcut) calls
/// `set_visible`. While a change is being applied the controller is `Applying`, and
/// any call arriving from a surface's own programmatic update is dropped, which is
/// what keeps checkbox change events from looping back.
pub struct VisibilityController {
    state: OverlayState,
    guard: Cell<GuardState>,
    settings: Rc<RefCell<SettingsStore>>,
    surfaces: RefCell<BTreeMap<SurfaceSlot, Box<dyn VisibilitySurface>>>,
    change_callback: RefCell<Option<ChangeCallback>>,
    synchronizer: RefCell<Option<Rc<PositionSynchronizer>>>,
}

impl VisibilityController {
    pub fn new(settings: Rc<RefCell<SettingsStore>>) -> Self {
        let visible = settings.borrow().settings().visible;
        Self {
            state: OverlayState::new(visible),
            guard: Cell::new(GuardState::Idle),
            settings,
            surfaces: RefCell::new(BTreeMap::new()),
            change_callback: RefCell::new(None),
            synchronizer: RefCell::new(None),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    /// Does not propagate; call `refresh` once all surfaces are in place.
    pub fn register_surface(&self, slot: SurfaceSlot, surface: Box<dyn VisibilitySurface>) {
        tracing::debug!(?slot, "visibility surface registered");
        self.surfaces.borrow_mut().insert(slot, surface);
    }

    pub fn set_change_callback(&self, callback: ChangeCallback) {
        *self.change_callback.borrow_mut() = Some(callback);
    }

    /// Synchronizer to run once whenever the overlay goes from hidden to shown.
    pub fn attach_synchronizer(&self, synchronizer: Rc<PositionSynchronizer>) {
        *self.synchronizer.borrow_mut() = Some(synchronizer);
    }

    /// `Some(v)` sets the flag, `None` inverts it. Ignored while a change is applying.
    pub fn set_visible(&self, target: Option<bool>) {
        let Some(_applying) = Applying::enter(&self.guard) else {
            tracing::trace!(?target, "ignoring re-entrant visibility change");
            return;
        };

        let previous = self.state.is_visible();
        let next = target.unwrap_or(!previous);
        self.state.set(next);

        let persisted = self.settings.borrow_mut().set_visible(next);
        if let Err(e) = persisted {
            tracing::warn!(error = %e, "could not persist overlay visibility");
        }
        if previous != next {
            tracing::debug!(from = previous, to = next, "overlay visibility updated");
        }

        self.propagate(previous);
    }

    /// Re-pushes the current value to every surface.
    pub fn refresh(&self) {
        self.set_visible(Some(self.is_visible()));
    }

    fn propagate(&self, was_visible: bool) {
        let visible = self.state.is_visible();

        for surface in self.surfaces.borrow().values() {
            surface.show(visible);
        }

        let callback = self.change_callback.borrow().clone();
        if let Some(callback) = callback {
            callback(visible);
        }

        if visible && !was_visible {
            let synchronizer = self.synchronizer.borrow().clone();
            if let Some(synchronizer) = synchronizer {
                synchronizer.sync_position();
            }
        }
    }
}
