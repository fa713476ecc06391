use crate::geo::{Coordinate, Crs};
use crate::settings::OverlaySettings;
use crate::style::{StyleRule, compose_styles, traffic_enabled};

/// Read side of the host editor's map.
pub trait HostMapView {
    /// Current center in `self.crs()`, `None` while the map is not ready.
    fn center(&self) -> Option<Coordinate>;
    fn zoom(&self) -> Option<u32>;
    fn crs(&self) -> Crs {
        Crs::WebMercator
    }
}

/// Write side of the provider's overlay map.
pub trait OverlayMapView {
    /// `center` is in `self.crs()`.
    fn pan_to(&self, center: Coordinate);
    fn set_zoom(&self, zoom: u32);
    fn set_styles(&self, rules: &[StyleRule]);
    fn set_traffic_visible(&self, visible: bool);
    fn crs(&self) -> Crs {
        Crs::Wgs84
    }
}

/// Recomputes and applies the overlay's styles and traffic layer for `settings`.
pub fn restyle(map: &dyn OverlayMapView, settings: &OverlaySettings) {
    let rules = compose_styles(settings);
    map.set_styles(&rules);
    let traffic = traffic_enabled(settings);
    map.set_traffic_visible(traffic);
    tracing::debug!(
        rules = rules.len(),
        traffic,
        theme = settings.theme.name(),
        "overlay styles updated"
    );
}

#[cfg(test)]
mod tests {
    use super::restyle;
    use crate::settings::OverlaySettings;
    use crate::testing::{FakeOverlay, OverlayOp};

    #[test]
    fn restyle_sets_styles_then_traffic() {
        let overlay = FakeOverlay::default();
        let mut settings = OverlaySettings::default();
        settings.set_feature("traffic", false);

        restyle(&overlay, &settings);

        let ops = overlay.ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], OverlayOp::Styles(n) if n == 7));
        assert_eq!(ops[1], OverlayOp::Traffic(false));
    }
}
