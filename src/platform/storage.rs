//! Key/value persistence
//!
//! The browser build keeps everything in LocalStorage. Native builds and
//! tests use an in-memory map. Reads never fail loudly: a missing or
//! unreadable value is simply absent.

use std::collections::HashMap;

/// Minimal string storage, shaped after the Web Storage API
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Returns false if the write was rejected (quota, privacy mode)
    fn set_item(&mut self, key: &str, value: &str) -> bool;
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let storage = Self::storage()?;
        match storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("LocalStorage read of {} failed: {:?}", key, e);
                None
            }
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        match Self::storage() {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }
}
