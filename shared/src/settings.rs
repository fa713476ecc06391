use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FEATURES, Feature, feature};
use crate::themes::Theme;

/// Storage key of the JSON settings blob.
pub const SETTINGS_KEY: &str = "WMEGoogleMapsLayers-settings";
/// Flat `"true"`/`"false"` key older releases stored the enabled flag under.
pub const LEGACY_ENABLED_KEY: &str = "WMEGoogleMapsLayers-enabled";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage rejected write to {key}: {reason}")]
    Rejected { key: String, reason: String },
}

/// Minimal string key-value capability (browser local storage in production).
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store, used when the browser denies access to local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Everything the overlay persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub visible: bool,
    /// Only features the user has touched; the rest use their catalog default.
    pub features: BTreeMap<String, bool>,
    pub theme: Theme,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            visible: false,
            features: BTreeMap::new(),
            theme: Theme::Standard,
        }
    }
}

impl OverlaySettings {
    pub fn feature_enabled(&self, feature: &Feature) -> bool {
        self.features
            .get(feature.id)
            .copied()
            .unwrap_or(feature.default_enabled)
    }

    /// Unknown ids read as disabled.
    pub fn feature_enabled_by_id(&self, id: &str) -> bool {
        match feature(id) {
            Some(f) => self.feature_enabled(f),
            None => self.features.get(id).copied().unwrap_or(false),
        }
    }

    /// Returns whether the effective value changed.
    pub fn set_feature(&mut self, id: &str, enabled: bool) -> bool {
        let before = self.feature_enabled_by_id(id);
        self.features.insert(id.to_string(), enabled);
        before != enabled
    }

    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn encode(&self) -> String {
        // A struct of bools, strings and a string-keyed map always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Reads the flat keys written by older releases. `None` if none are present.
    fn from_legacy(store: &dyn KeyValueStore) -> Option<Self> {
        let mut found = false;
        let mut settings = Self::default();

        if let Some(raw) = store.read(LEGACY_ENABLED_KEY) {
            found = true;
            settings.visible = raw.trim() == "true";
        }
        for f in FEATURES {
            if let Some(raw) = store.read(f.id) {
                found = true;
                settings.features.insert(f.id.to_string(), raw.trim() == "true");
            }
        }
        // Older releases had one "Roads & Traffic" toggle driving both.
        if let Some(&road) = settings.features.get("road") {
            settings.features.entry("traffic".to_string()).or_insert(road);
        }
        found.then_some(settings)
    }
}

/// Owns the persisted blob: loads it once, writes it back on every change.
pub struct SettingsStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
    current: OverlaySettings,
}

impl SettingsStore {
    /// Loads settings from `key`, falling back to legacy keys and then to defaults.
    pub fn load(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        let current = match backend.read(key) {
            Some(raw) => OverlaySettings::decode(&raw).unwrap_or_else(|| {
                tracing::warn!(key, "stored settings are unreadable, using defaults");
                OverlaySettings::default()
            }),
            None => match OverlaySettings::from_legacy(backend.as_ref()) {
                Some(migrated) => {
                    tracing::info!(key, "migrated settings from legacy storage keys");
                    if let Err(e) = backend.write(key, &migrated.encode()) {
                        tracing::warn!(error = %e, "could not persist migrated settings");
                    }
                    migrated
                }
                None => {
                    tracing::debug!(key, "no stored settings, using defaults");
                    OverlaySettings::default()
                }
            },
        };

        Self {
            backend,
            key: key.to_string(),
            current,
        }
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.current
    }

    /// `Ok(false)` means the value was already set and nothing was written.
    pub fn set_visible(&mut self, visible: bool) -> Result<bool, StoreError> {
        if self.current.visible == visible {
            return Ok(false);
        }
        self.current.visible = visible;
        self.persist().map(|_| true)
    }

    pub fn set_feature(&mut self, id: &str, enabled: bool) -> Result<bool, StoreError> {
        if self.current.features.get(id) == Some(&enabled) {
            return Ok(false);
        }
        let changed = self.current.set_feature(id, enabled);
        self.persist().map(|_| changed)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<bool, StoreError> {
        if self.current.theme == theme {
            return Ok(false);
        }
        self.current.theme = theme;
        self.persist().map(|_| true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.backend.write(&self.key, &self.current.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        KeyValueStore, LEGACY_ENABLED_KEY, MemoryStore, OverlaySettings, SETTINGS_KEY,
        SettingsStore,
    };
    use crate::features::FEATURES;
    use crate::style::traffic_enabled;
    use crate::testing::RecordingStore;
    use crate::themes::Theme;
    use serde_json::json;

    #[test]
    fn absent_blob_yields_defaults() {
        let store = SettingsStore::load(Box::new(MemoryStore::default()), SETTINGS_KEY);
        let s = store.settings();

        assert!(!s.visible);
        assert_eq!(s.theme, Theme::Standard);
        for f in FEATURES {
            let expected = matches!(f.id, "road" | "traffic");
            assert_eq!(s.feature_enabled(f), expected, "{}", f.id);
        }
    }

    #[test]
    fn corrupt_blob_yields_defaults() {
        let backend = MemoryStore::default();
        backend.write(SETTINGS_KEY, "{not json").unwrap();
        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        assert_eq!(store.settings(), &OverlaySettings::default());
    }

    #[test]
    fn wrong_field_types_yield_defaults() {
        let backend = MemoryStore::default();
        backend
            .write(SETTINGS_KEY, &json!({ "visible": "yes" }).to_string())
            .unwrap();
        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        assert!(!store.settings().visible);
    }

    #[test]
    fn partial_blob_fills_missing_fields() {
        let backend = MemoryStore::default();
        backend
            .write(SETTINGS_KEY, &json!({ "visible": true }).to_string())
            .unwrap();
        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        assert!(store.settings().visible);
        assert_eq!(store.settings().theme, Theme::Standard);
        assert!(store.settings().features.is_empty());
    }

    #[test]
    fn features_and_theme_survive_reload() {
        let backend = RecordingStore::default();
        let shared = backend.clone();

        let mut store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        store.set_feature("road", true).unwrap();
        store.set_feature("poi", false).unwrap();
        store.set_theme(Theme::Night).unwrap();

        let reloaded = SettingsStore::load(Box::new(shared), SETTINGS_KEY);
        let s = reloaded.settings();
        assert_eq!(s.features.len(), 2);
        assert_eq!(s.features.get("road"), Some(&true));
        assert_eq!(s.features.get("poi"), Some(&false));
        assert_eq!(s.theme, Theme::Night);
        assert_eq!(s, store.settings());
    }

    #[test]
    fn blob_shape_uses_theme_name() {
        let backend = RecordingStore::default();
        let shared = backend.clone();
        let mut store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        store.set_theme(Theme::Night).unwrap();

        let raw = shared.read(SETTINGS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            json!({ "visible": false, "features": {}, "theme": "nightMapStyle" })
        );
    }

    #[test]
    fn unchanged_values_are_not_rewritten() {
        let backend = RecordingStore::default();
        let shared = backend.clone();
        let mut store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);

        assert_eq!(store.set_visible(false), Ok(false));
        assert_eq!(store.set_theme(Theme::Standard), Ok(false));
        assert_eq!(shared.write_count(), 0);

        assert_eq!(store.set_visible(true), Ok(true));
        assert_eq!(store.set_visible(true), Ok(false));
        assert_eq!(shared.write_count(), 1);
    }

    #[test]
    fn explicit_default_feature_is_still_recorded() {
        let backend = RecordingStore::default();
        let shared = backend.clone();
        let mut store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);

        assert_eq!(store.set_feature("road", true), Ok(false));
        assert_eq!(shared.write_count(), 1);
        assert_eq!(store.set_feature("road", true), Ok(false));
        assert_eq!(shared.write_count(), 1);
    }

    #[test]
    fn failed_write_keeps_in_memory_value() {
        let backend = RecordingStore::default();
        backend.fail_writes(true);
        let mut store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);

        assert!(store.set_visible(true).is_err());
        assert!(store.settings().visible);
    }

    #[test]
    fn legacy_keys_are_migrated() {
        let backend = RecordingStore::default();
        backend.write(LEGACY_ENABLED_KEY, "true").unwrap();
        backend.write("poi", "true").unwrap();
        backend.write("road", "false").unwrap();
        let shared = backend.clone();

        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        let s = store.settings();
        assert!(s.visible);
        assert_eq!(s.feature_enabled_by_id("poi"), true);
        assert_eq!(s.feature_enabled_by_id("road"), false);
        assert_eq!(s.feature_enabled_by_id("traffic"), false);

        let persisted = OverlaySettings::decode(&shared.read(SETTINGS_KEY).unwrap()).unwrap();
        assert_eq!(&persisted, s);
    }

    #[test]
    fn legacy_road_toggle_drives_traffic_layer() {
        for road in [false, true] {
            let backend = MemoryStore::default();
            backend.write(LEGACY_ENABLED_KEY, "true").unwrap();
            backend.write("road", &road.to_string()).unwrap();

            let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
            assert_eq!(traffic_enabled(store.settings()), road);
        }
    }

    #[test]
    fn legacy_traffic_key_is_not_overridden_by_road() {
        let backend = MemoryStore::default();
        backend.write("road", "false").unwrap();
        backend.write("traffic", "true").unwrap();

        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        assert!(!store.settings().feature_enabled_by_id("road"));
        assert!(traffic_enabled(store.settings()));
    }

    #[test]
    fn blob_wins_over_legacy_keys() {
        let backend = MemoryStore::default();
        backend.write(LEGACY_ENABLED_KEY, "true").unwrap();
        backend
            .write(SETTINGS_KEY, &json!({ "visible": false }).to_string())
            .unwrap();
        let store = SettingsStore::load(Box::new(backend), SETTINGS_KEY);
        assert!(!store.settings().visible);
    }
}
