/// What a feature toggle drives on the overlay map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureTarget {
    /// A provider style rule keyed by `featureType` and optional `elementType`.
    Style {
        feature_type: &'static str,
        element_type: Option<&'static str>,
    },
    /// The provider's live traffic layer.
    TrafficLayer,
}

/// One user-toggleable map feature category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub id: &'static str,
    pub target: FeatureTarget,
    pub label: &'static str,
    pub description: &'static str,
    pub default_enabled: bool,
}

const fn style(feature_type: &'static str) -> FeatureTarget {
    FeatureTarget::Style {
        feature_type,
        element_type: None,
    }
}

/// Every feature the settings panel offers, in display order.
pub const FEATURES: &[Feature] = &[
    Feature {
        id: "road",
        target: style("road"),
        label: "Roads",
        description: "Road geometry and road labels",
        default_enabled: true,
    },
    Feature {
        id: "traffic",
        target: FeatureTarget::TrafficLayer,
        label: "Traffic",
        description: "Live traffic conditions",
        default_enabled: true,
    },
    Feature {
        id: "administrative_land_parcel",
        target: style("administrative.land_parcel"),
        label: "Land Parcels",
        description: "Property boundaries where available",
        default_enabled: false,
    },
    Feature {
        id: "landscape",
        target: style("landscape"),
        label: "General Landscape",
        description: "Natural and man-made land cover",
        default_enabled: false,
    },
    Feature {
        id: "poi",
        target: style("poi"),
        label: "Points of Interest",
        description: "Businesses, parks, schools and landmarks",
        default_enabled: false,
    },
    Feature {
        id: "transit",
        target: style("transit"),
        label: "Public Transit Features",
        description: "Rail lines and transit stations",
        default_enabled: false,
    },
    Feature {
        id: "water",
        target: style("water"),
        label: "Water Bodies",
        description: "Lakes, rivers and coastlines",
        default_enabled: false,
    },
];

/// Style feature types hidden by default before enabled features are switched back on.
pub const BASE_HIDDEN_FEATURE_TYPES: &[&str] = &[
    "administrative",
    "poi",
    "road",
    "transit",
    "landscape",
    "water",
];

pub fn feature(id: &str) -> Option<&'static Feature> {
    FEATURES.iter().find(|f| f.id == id)
}

#[cfg(test)]
mod tests {
    use super::{FEATURES, FeatureTarget, feature};

    /// Storage ids older releases derived from style selectors.
    fn feature_id(feature_type: &str, element_type: Option<&str>) -> String {
        let mut id = feature_type.replace('.', "_");
        if let Some(element_type) = element_type {
            id.push('_');
            id.push_str(&element_type.replace('.', "_"));
        }
        id
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in FEATURES.iter().enumerate() {
            for b in &FEATURES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn style_feature_ids_derive_from_selectors() {
        for f in FEATURES {
            if let FeatureTarget::Style {
                feature_type,
                element_type,
            } = f.target
            {
                assert_eq!(feature_id(feature_type, element_type), f.id);
            }
        }
    }

    #[test]
    fn feature_id_qualifies_element_type() {
        assert_eq!(feature_id("road", None), "road");
        assert_eq!(
            feature_id("administrative.land_parcel", Some("labels.text")),
            "administrative_land_parcel_labels_text"
        );
    }

    #[test]
    fn only_roads_and_traffic_default_on() {
        let on: Vec<&str> = FEATURES
            .iter()
            .filter(|f| f.default_enabled)
            .map(|f| f.id)
            .collect();
        assert_eq!(on, vec!["road", "traffic"]);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(
            feature("traffic").map(|f| f.target),
            Some(FeatureTarget::TrafficLayer)
        );
        assert!(feature("nope").is_none());
    }
}
