use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::style::{StyleRule, Styler, Visibility};

/// Named style presets offered by the theme selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Standard,
    Night,
    Silver,
    Retro,
    Aubergine,
    Neon,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Standard,
        Theme::Night,
        Theme::Silver,
        Theme::Retro,
        Theme::Aubergine,
        Theme::Neon,
    ];

    /// Persisted name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Standard => "standardMapStyle",
            Theme::Night => "nightMapStyle",
            Theme::Silver => "silverMapStyle",
            Theme::Retro => "retroMapStyle",
            Theme::Aubergine => "aubergineMapStyle",
            Theme::Neon => "neonMapStyle",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Standard => "Standard",
            Theme::Night => "Night",
            Theme::Silver => "Silver",
            Theme::Retro => "Retro",
            Theme::Aubergine => "Aubergine",
            Theme::Neon => "Neon",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn rules(self) -> Vec<StyleRule> {
        preset(self).iter().map(PresetRule::to_rule).collect()
    }
}

impl Serialize for Theme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Unknown names decode to the default preset instead of failing the whole blob.
impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Theme::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(theme = %name, "unknown theme name, using default");
            Theme::default()
        }))
    }
}

enum PresetStyler {
    Color(&'static str),
    Hide,
}

struct PresetRule {
    feature_type: Option<&'static str>,
    element_type: Option<&'static str>,
    styler: PresetStyler,
}

impl PresetRule {
    fn to_rule(&self) -> StyleRule {
        StyleRule {
            feature_type: self.feature_type.map(str::to_string),
            element_type: self.element_type.map(str::to_string),
            stylers: vec![match self.styler {
                PresetStyler::Color(c) => Styler::Color(c.to_string()),
                PresetStyler::Hide => Styler::Visibility(Visibility::Off),
            }],
        }
    }
}

const fn c(
    feature_type: Option<&'static str>,
    element_type: &'static str,
    color: &'static str,
) -> PresetRule {
    PresetRule {
        feature_type,
        element_type: Some(element_type),
        styler: PresetStyler::Color(color),
    }
}

const fn hide(feature_type: Option<&'static str>, element_type: &'static str) -> PresetRule {
    PresetRule {
        feature_type,
        element_type: Some(element_type),
        styler: PresetStyler::Hide,
    }
}

fn preset(theme: Theme) -> &'static [PresetRule] {
    match theme {
        Theme::Standard => &[],
        Theme::Night => NIGHT,
        Theme::Silver => SILVER,
        Theme::Retro => RETRO,
        Theme::Aubergine => AUBERGINE,
        Theme::Neon => NEON,
    }
}

const NIGHT: &[PresetRule] = &[
    c(None, "geometry", "#242f3e"),
    c(None, "labels.text.stroke", "#242f3e"),
    c(None, "labels.text.fill", "#746855"),
    c(Some("administrative.locality"), "labels.text.fill", "#d59563"),
    c(Some("poi"), "labels.text.fill", "#d59563"),
    c(Some("poi.park"), "geometry", "#263c3f"),
    c(Some("poi.park"), "labels.text.fill", "#6b9a76"),
    c(Some("road"), "geometry", "#38414e"),
    c(Some("road"), "geometry.stroke", "#212a37"),
    c(Some("road"), "labels.text.fill", "#9ca5b3"),
    c(Some("road.highway"), "geometry", "#746855"),
    c(Some("road.highway"), "geometry.stroke", "#1f2835"),
    c(Some("road.highway"), "labels.text.fill", "#f3d19c"),
    c(Some("transit"), "geometry", "#2f3948"),
    c(Some("transit.station"), "labels.text.fill", "#d59563"),
    c(Some("water"), "geometry", "#17263c"),
    c(Some("water"), "labels.text.fill", "#515c6d"),
    c(Some("water"), "labels.text.stroke", "#17263c"),
];

const SILVER: &[PresetRule] = &[
    c(None, "geometry", "#f5f5f5"),
    hide(None, "labels.icon"),
    c(None, "labels.text.fill", "#616161"),
    c(None, "labels.text.stroke", "#f5f5f5"),
    c(Some("administrative.land_parcel"), "labels.text.fill", "#bdbdbd"),
    c(Some("poi"), "geometry", "#eeeeee"),
    c(Some("poi"), "labels.text.fill", "#757575"),
    c(Some("poi.park"), "geometry", "#e5e5e5"),
    c(Some("poi.park"), "labels.text.fill", "#9e9e9e"),
    c(Some("road"), "geometry", "#ffffff"),
    c(Some("road.arterial"), "labels.text.fill", "#757575"),
    c(Some("road.highway"), "geometry", "#dadada"),
    c(Some("road.highway"), "labels.text.fill", "#616161"),
    c(Some("road.local"), "labels.text.fill", "#9e9e9e"),
    c(Some("transit.line"), "geometry", "#e5e5e5"),
    c(Some("transit.station"), "geometry", "#eeeeee"),
    c(Some("water"), "geometry", "#c9c9c9"),
    c(Some("water"), "labels.text.fill", "#9e9e9e"),
];

const RETRO: &[PresetRule] = &[
    c(None, "geometry", "#ebe3cd"),
    c(None, "labels.text.fill", "#523735"),
    c(None, "labels.text.stroke", "#f5f1e6"),
    c(Some("administrative"), "geometry.stroke", "#c9b2a6"),
    c(Some("administrative.land_parcel"), "geometry.stroke", "#dcd2be"),
    c(Some("administrative.land_parcel"), "labels.text.fill", "#ae9e90"),
    c(Some("landscape.natural"), "geometry", "#dfd2ae"),
    c(Some("poi"), "geometry", "#dfd2ae"),
    c(Some("poi"), "labels.text.fill", "#93817c"),
    c(Some("poi.park"), "geometry.fill", "#a5b076"),
    c(Some("poi.park"), "labels.text.fill", "#447530"),
    c(Some("road"), "geometry", "#f5f1e6"),
    c(Some("road.arterial"), "geometry", "#fdfcf8"),
    c(Some("road.highway"), "geometry", "#f8c967"),
    c(Some("road.highway"), "geometry.stroke", "#e9bc62"),
    c(Some("road.highway.controlled_access"), "geometry", "#e98d58"),
    c(Some("road.highway.controlled_access"), "geometry.stroke", "#db8555"),
    c(Some("road.local"), "labels.text.fill", "#806b63"),
    c(Some("transit.line"), "geometry", "#dfd2ae"),
    c(Some("transit.line"), "labels.text.fill", "#8f7d77"),
    c(Some("transit.line"), "labels.text.stroke", "#ebe3cd"),
    c(Some("transit.station"), "geometry", "#dfd2ae"),
    c(Some("water"), "geometry.fill", "#b9d3c2"),
    c(Some("water"), "labels.text.fill", "#92998d"),
];

const AUBERGINE: &[PresetRule] = &[
    c(None, "geometry", "#1d2c4d"),
    c(None, "labels.text.fill", "#8ec3b9"),
    c(None, "labels.text.stroke", "#1a3646"),
    c(Some("administrative.country"), "geometry.stroke", "#4b6878"),
    c(Some("administrative.land_parcel"), "labels.text.fill", "#64779e"),
    c(Some("administrative.province"), "geometry.stroke", "#4b6878"),
    c(Some("landscape.man_made"), "geometry.stroke", "#334e87"),
    c(Some("landscape.natural"), "geometry", "#023e58"),
    c(Some("poi"), "geometry", "#283d6a"),
    c(Some("poi"), "labels.text.fill", "#6f9ba5"),
    c(Some("poi"), "labels.text.stroke", "#1d2c4d"),
    c(Some("poi.park"), "geometry.fill", "#023e58"),
    c(Some("poi.park"), "labels.text.fill", "#3c7680"),
    c(Some("road"), "geometry", "#304a7d"),
    c(Some("road"), "labels.text.fill", "#98a5be"),
    c(Some("road"), "labels.text.stroke", "#1d2c4d"),
    c(Some("road.highway"), "geometry", "#2c6675"),
    c(Some("road.highway"), "geometry.stroke", "#255763"),
    c(Some("road.highway"), "labels.text.fill", "#b0d5ce"),
    c(Some("road.highway"), "labels.text.stroke", "#023e58"),
    c(Some("transit"), "labels.text.fill", "#98a5be"),
    c(Some("transit"), "labels.text.stroke", "#1d2c4d"),
    c(Some("transit.line"), "geometry.fill", "#283d6a"),
    c(Some("transit.station"), "geometry", "#3a4762"),
    c(Some("water"), "geometry", "#0e1626"),
    c(Some("water"), "labels.text.fill", "#4e6d70"),
];

const NEON: &[PresetRule] = &[
    c(None, "geometry", "#0b0b1a"),
    c(None, "labels.text.fill", "#39ff14"),
    c(None, "labels.text.stroke", "#0b0b1a"),
    hide(None, "labels.icon"),
    c(Some("administrative"), "geometry.stroke", "#ff2bd6"),
    c(Some("landscape"), "geometry", "#12122b"),
    c(Some("poi"), "geometry", "#1b1040"),
    c(Some("poi"), "labels.text.fill", "#ff6ec7"),
    c(Some("road"), "geometry", "#ff00ff"),
    c(Some("road"), "labels.text.fill", "#fdfd96"),
    c(Some("road.highway"), "geometry", "#00ffff"),
    c(Some("road.highway"), "geometry.stroke", "#008b8b"),
    c(Some("transit"), "geometry", "#ffaa00"),
    c(Some("water"), "geometry", "#0033ff"),
    c(Some("water"), "labels.text.fill", "#7df9ff"),
];

#[cfg(test)]
mod tests {
    use super::Theme;
    use crate::style::Styler;

    #[test]
    fn names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(Theme::from_name("sepiaMapStyle"), None);
    }

    #[test]
    fn default_is_standard_with_no_rules() {
        assert_eq!(Theme::default(), Theme::Standard);
        assert!(Theme::Standard.rules().is_empty());
    }

    #[test]
    fn every_other_preset_sets_base_geometry_color() {
        for theme in Theme::ALL.into_iter().filter(|t| *t != Theme::Standard) {
            let rules = theme.rules();
            let first = &rules[0];
            assert_eq!(first.feature_type, None, "{theme:?}");
            assert_eq!(first.element_type.as_deref(), Some("geometry"), "{theme:?}");
            assert!(matches!(first.stylers[0], Styler::Color(_)), "{theme:?}");
        }
    }

    #[test]
    fn serde_uses_persisted_names() {
        assert_eq!(
            serde_json::to_string(&Theme::Aubergine).unwrap(),
            "\"aubergineMapStyle\""
        );
        let t: Theme = serde_json::from_str("\"retroMapStyle\"").unwrap();
        assert_eq!(t, Theme::Retro);
    }

    #[test]
    fn unknown_name_decodes_to_default() {
        let t: Theme = serde_json::from_str("\"psychedelicMapStyle\"").unwrap();
        assert_eq!(t, Theme::Standard);
    }
}
