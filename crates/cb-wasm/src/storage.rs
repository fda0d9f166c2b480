//! `localStorage` backend for the board store.

use cb_core::store::StorageBackend;
use web_sys::Storage;

/// Browser `localStorage` behind the `StorageBackend` trait.
///
/// When storage is unavailable (private browsing, sandboxed frame) the
/// handle is `None` and every call reports an error; the store's
/// log-and-swallow contract keeps the session alive on in-memory state.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, boards will not persist");
        }
        Self { storage }
    }

    fn handle(&self) -> Result<&Storage, String> {
        self.storage
            .as_ref()
            .ok_or_else(|| "localStorage unavailable".to_string())
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.handle()?
            .get_item(key)
            .map_err(|err| format!("{err:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.handle()?
            .set_item(key, value)
            .map_err(|err| format!("{err:?}"))
    }

    fn remove(&mut self, key: &str) -> Result<(), String> {
        self.handle()?
            .remove_item(key)
            .map_err(|err| format!("{err:?}"))
    }
}
