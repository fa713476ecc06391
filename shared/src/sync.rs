use std::cell::RefCell;
use std::rc::Rc;

use crate::controller::OverlayState;
use crate::geo::{Coordinate, CoordinateTransform, reproject};
use crate::map::{HostMapView, OverlayMapView};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Overlay moved to `center` (overlay CRS) at `zoom`.
    Applied { center: Coordinate, zoom: u32 },
    Hidden,
    /// Host or overlay map not attached yet.
    Detached,
    /// Host reported no usable position.
    HostUnavailable,
}

/// Mirrors the host map's center and zoom onto the overlay map. Host to overlay only.
pub struct PositionSynchronizer {
    state: OverlayState,
    transform: Rc<dyn CoordinateTransform>,
    host: RefCell<Option<Rc<dyn HostMapView>>>,
    overlay: RefCell<Option<Rc<dyn OverlayMapView>>>,
}

impl PositionSynchronizer {
    pub fn new(state: OverlayState, transform: Rc<dyn CoordinateTransform>) -> Self {
        Self {
            state,
            transform,
            host: RefCell::new(None),
            overlay: RefCell::new(None),
        }
    }

    pub fn attach_host(&self, host: Rc<dyn HostMapView>) {
        *self.host.borrow_mut() = Some(host);
    }

    pub fn attach_overlay(&self, overlay: Rc<dyn OverlayMapView>) {
        *self.overlay.borrow_mut() = Some(overlay);
    }

    /// Reads the host position and writes it to the overlay. Never reads the overlay back.
    pub fn sync_position(&self) -> SyncOutcome {
        let host = self.host.borrow().clone();
        let overlay = self.overlay.borrow().clone();
        let (Some(host), Some(overlay)) = (host, overlay) else {
            return SyncOutcome::Detached;
        };
        if !self.state.is_visible() {
            return SyncOutcome::Hidden;
        }

        let (Some(center), Some(zoom)) = (host.center(), host.zoom()) else {
            tracing::debug!("host map position unavailable, skipping sync");
            return SyncOutcome::HostUnavailable;
        };
        let center = reproject(self.transform.as_ref(), center, host.crs(), overlay.crs());
        if !center.is_finite() {
            tracing::warn!(x = center.x, y = center.y, "transformed center is not finite");
            return SyncOutcome::HostUnavailable;
        }

        overlay.pan_to(center);
        overlay.set_zoom(zoom);
        tracing::debug!(lon = center.x, lat = center.y, zoom, "overlay synchronized to host");
        SyncOutcome::Applied { center, zoom }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{PositionSynchronizer, SyncOutcome};
    use crate::controller::OverlayState;
    use crate::geo::{Coordinate, Crs};
    use crate::testing::{FakeHost, FakeOverlay, OverlayOp, halving_transform, identity_transform};

    fn attached(
        visible: bool,
        host: Rc<FakeHost>,
    ) -> (PositionSynchronizer, Rc<FakeOverlay>) {
        let sync = PositionSynchronizer::new(OverlayState::new(visible), halving_transform());
        let overlay = Rc::new(FakeOverlay::default());
        sync.attach_host(host);
        sync.attach_overlay(overlay.clone());
        (sync, overlay)
    }

    #[test]
    fn detached_is_noop() {
        let sync = PositionSynchronizer::new(OverlayState::new(true), identity_transform());
        assert_eq!(sync.sync_position(), SyncOutcome::Detached);

        let overlay = Rc::new(FakeOverlay::default());
        sync.attach_overlay(overlay.clone());
        assert_eq!(sync.sync_position(), SyncOutcome::Detached);
        assert!(overlay.ops().is_empty());
    }

    #[test]
    fn hidden_is_noop() {
        let (sync, overlay) = attached(false, Rc::new(FakeHost::at(100.0, 200.0, 12)));
        assert_eq!(sync.sync_position(), SyncOutcome::Hidden);
        assert!(overlay.ops().is_empty());
    }

    #[test]
    fn copies_transformed_center_and_zoom() {
        let (sync, overlay) = attached(true, Rc::new(FakeHost::at(100.0, 200.0, 12)));

        let outcome = sync.sync_position();

        let expected = Coordinate::new(50.0, 100.0);
        assert_eq!(
            outcome,
            SyncOutcome::Applied {
                center: expected,
                zoom: 12
            }
        );
        assert_eq!(
            overlay.ops(),
            vec![OverlayOp::PanTo(expected), OverlayOp::Zoom(12)]
        );
    }

    #[test]
    fn same_crs_skips_transform() {
        let host = Rc::new(FakeHost::at(7.0, 8.0, 3).with_crs(Crs::Wgs84));
        let (sync, overlay) = attached(true, host);
        sync.sync_position();
        assert_eq!(overlay.ops()[0], OverlayOp::PanTo(Coordinate::new(7.0, 8.0)));
    }

    #[test]
    fn repeated_sync_is_idempotent() {
        let (sync, overlay) = attached(true, Rc::new(FakeHost::at(-3.5, 9.25, 17)));

        let first = sync.sync_position();
        let second = sync.sync_position();

        let (
            SyncOutcome::Applied { center: a, zoom: za },
            SyncOutcome::Applied { center: b, zoom: zb },
        ) = (first, second)
        else {
            panic!("expected both syncs to apply, got {first:?} / {second:?}");
        };
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
        assert_eq!(za, zb);
        assert_eq!(overlay.last_center(), Some(a));
        assert_eq!(overlay.last_zoom(), Some(17));
    }

    #[test]
    fn move_then_zoom_each_read_fresh_host_state() {
        let host = Rc::new(FakeHost::at(0.0, 0.0, 10));
        let (sync, overlay) = attached(true, host.clone());

        host.move_to(40.0, 60.0);
        sync.sync_position();
        host.set_zoom(11);
        sync.sync_position();

        assert_eq!(
            overlay.ops(),
            vec![
                OverlayOp::PanTo(Coordinate::new(20.0, 30.0)),
                OverlayOp::Zoom(10),
                OverlayOp::PanTo(Coordinate::new(20.0, 30.0)),
                OverlayOp::Zoom(11),
            ]
        );
    }

    #[test]
    fn host_without_position_is_skipped() {
        let host = Rc::new(FakeHost::default());
        let (sync, overlay) = attached(true, host);
        assert_eq!(sync.sync_position(), SyncOutcome::HostUnavailable);
        assert!(overlay.ops().is_empty());
    }

    #[test]
    fn non_finite_transform_result_is_skipped() {
        let sync = PositionSynchronizer::new(
            OverlayState::new(true),
            Rc::new(|_: Coordinate, _: Crs, _: Crs| Coordinate::new(f64::NAN, 0.0)),
        );
        let overlay = Rc::new(FakeOverlay::default());
        sync.attach_host(Rc::new(FakeHost::at(1.0, 1.0, 5)));
        sync.attach_overlay(overlay.clone());

        assert_eq!(sync.sync_position(), SyncOutcome::HostUnavailable);
        assert!(overlay.ops().is_empty());
    }
}
