//! Key/value settings persistence.
//!
//! Values are stored as JSON strings under namespaced keys. Backends implement
//! [`SettingsStore`]; callers normally go through [`Settings`], which never
//! surfaces backend failures and hands back the caller's fallback instead.

mod file;
mod memory;

pub use file::Storage;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

const DEFAULT_NAMESPACE: &str = "pageruler";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("settings storage is unavailable")]
    Unavailable,
}

/// Raw string storage backend.
pub trait SettingsStore {
    /// Returns the stored string for `key`, or `None` when the key was never written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn store(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Typed, failure-tolerant view over a [`SettingsStore`].
pub struct Settings {
    store: Box<dyn SettingsStore>,
    namespace: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings").field("namespace", &self.namespace).finish_non_exhaustive()
    }
}

impl Settings {
    pub fn new(store: impl SettingsStore + 'static) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: impl SettingsStore + 'static, namespace: impl Into<String>) -> Self {
        Self { store: Box::new(store), namespace: namespace.into() }
    }

    /// In-memory settings, used by tests and headless runs.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads and parses `key`.
    ///
    /// Missing keys, unparsable values and storage failures all yield `fallback`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.store.load(&self.full_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(err) => {
                log::warn!("settings read of {key:?} failed: {err}");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("ignoring malformed setting {key:?}: {err}");
                fallback
            }
        }
    }

    /// Serializes and persists `value`. Failures are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("unable to serialize setting {key:?}: {err}");
                return;
            }
        };

        if let Err(err) = self.store.store(&self.full_key(key), raw) {
            log::warn!("settings write of {key:?} dropped: {err}");
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}#{}", self.namespace, key)
    }
}
