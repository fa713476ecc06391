use serde::Serialize;

use crate::features::{BASE_HIDDEN_FEATURE_TYPES, FEATURES, FeatureTarget};
use crate::settings::OverlaySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    On,
    Off,
}

/// A single provider styler, serialized as a one-key object (`{"color": "#242f3e"}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Styler {
    Color(String),
    Visibility(Visibility),
}

/// One entry of the provider's `styles` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRule {
    #[serde(rename = "featureType", skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(rename = "elementType", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    pub stylers: Vec<Styler>,
}

impl StyleRule {
    pub fn visibility(feature_type: &str, element_type: Option<&str>, v: Visibility) -> Self {
        Self {
            feature_type: Some(feature_type.to_string()),
            element_type: element_type.map(str::to_string),
            stylers: vec![Styler::Visibility(v)],
        }
    }
}

/// Full style list for the current settings: theme preset, then the base "everything
/// off" rules, then one "on" rule per enabled style feature. Later rules win.
pub fn compose_styles(settings: &OverlaySettings) -> Vec<StyleRule> {
    let mut rules = settings.theme.rules();
    rules.extend(
        BASE_HIDDEN_FEATURE_TYPES
            .iter()
            .map(|ft| StyleRule::visibility(ft, None, Visibility::Off)),
    );
    for feature in FEATURES {
        let FeatureTarget::Style {
            feature_type,
            element_type,
        } = feature.target
        else {
            continue;
        };
        if settings.feature_enabled(feature) {
            rules.push(StyleRule::visibility(
                feature_type,
                element_type,
                Visibility::On,
            ));
        }
    }
    rules
}

/// Whether any enabled feature asks for the live traffic layer.
pub fn traffic_enabled(settings: &OverlaySettings) -> bool {
    FEATURES
        .iter()
        .filter(|f| f.target == FeatureTarget::TrafficLayer)
        .any(|f| settings.feature_enabled(f))
}
