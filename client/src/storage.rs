use gloo_storage::{LocalStorage, Storage};
use wme_gmaps_shared::{KeyValueStore, MemoryStore, StoreError};

use crate::js;

/// Browser `localStorage`, raw string values. The core owns the JSON encoding so it can
/// migrate flat legacy keys, hence `raw()` and not typed `LocalStorage::get`/`set`.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    /// `None` when the page is not allowed to use local storage.
    pub fn open() -> Option<Self> {
        // `LocalStorage::raw` panics if storage is blocked; probe through `window` first.
        let window = web_sys::window()?;
        window.local_storage().ok().flatten()?;
        Some(Self {
            storage: LocalStorage::raw(),
        })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn read(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Rejected {
                key: key.to_string(),
                reason: js::describe(&e),
            })
    }
}

/// Local storage when available, otherwise an in-memory store for this page load.
pub fn open_backend() -> Box<dyn KeyValueStore> {
    match LocalStorageStore::open() {
        Some(store) => Box::new(store),
        None => {
            tracing::warn!("local storage unavailable, settings will not persist");
            Box::new(MemoryStore::default())
        }
    }
}
