//! Where the save string lives between sessions.
//!
//! The browser build persists to `localStorage`; tests and native hosts use
//! [`MemoryStore`]. A store that reports [`StorageError::Unavailable`] turns
//! save and load into no-ops.

use crate::config::SimConfig;
use crate::error::StorageError;

pub trait SaveStore {
    /// The stored save string, if any.
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, data: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory store. `unavailable()` builds one that refuses every call, the
/// way a browser with storage disabled behaves.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<String>,
    disabled: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            disabled: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            data: None,
            disabled: true,
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &str) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        self.data = Some(data.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable);
        }
        self.data = None;
        Ok(())
    }
}

/// Persistent store for this platform: `localStorage` under
/// `config.storage_key` in the browser, a fresh [`MemoryStore`] elsewhere.
#[cfg(target_arch = "wasm32")]
pub fn default_store(config: &SimConfig) -> Box<dyn SaveStore> {
    Box::new(LocalStorage::from_config(config))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store(config: &SimConfig) -> Box<dyn SaveStore> {
    log::debug!(
        "no local storage on this target, keeping '{}' in memory",
        config.storage_key
    );
    Box::new(MemoryStore::new())
}

/// `window.localStorage` under a single key.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.storage_key.clone())
    }

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn write(&mut self, data: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(&self.key, data)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(&self.key)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read().unwrap(), None);
        store.write("abc").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
        store.clear().unwrap();
        assert_eq!(store.data(), None);
    }

    #[test]
    fn default_store_starts_empty_and_writable() {
        let mut store = default_store(&SimConfig::default());
        assert_eq!(store.read().unwrap(), None);
        store.write("abc").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn unavailable_store_refuses_everything() {
        let mut store = MemoryStore::unavailable();
        assert!(matches!(store.read(), Err(StorageError::Unavailable)));
        assert!(matches!(store.write("x"), Err(StorageError::Unavailable)));
        assert!(matches!(store.clear(), Err(StorageError::Unavailable)));
    }
}
