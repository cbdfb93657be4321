use crate::{SettingsStore, StorageError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// Settings persisted as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PageRuler", "PageRuler")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    fn read_envelope(&self) -> Result<SettingsEnvelope, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, ..Default::default() });
        }

        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SettingsStore for Storage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let envelope = self.read_envelope()?;
        Ok(envelope.entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut envelope = match self.read_envelope() {
            Ok(envelope) => envelope,
            Err(StorageError::Serde(err)) => {
                log::warn!(
                    "replacing unreadable settings file {}: {err}",
                    self.settings_path().display()
                );
                SettingsEnvelope::default()
            }
            Err(err) => return Err(err),
        };
        envelope.version = SETTINGS_SCHEMA_VERSION;
        envelope.entries.insert(key.to_owned(), value);

        fs::create_dir_all(&self.root)?;
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    #[test]
    fn settings_round_trip_on_disk() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());

        store.store("pageruler#length_unit", "\"in\"".to_owned()).expect("store should succeed");
        let loaded = store.load("pageruler#length_unit").expect("load should succeed");

        assert_eq!(loaded.as_deref(), Some("\"in\""));
    }

    #[test]
    fn load_is_empty_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path().join("nested"));

        assert_eq!(store.load("pageruler#length_unit").expect("load should succeed"), None);
    }

    #[test]
    fn writes_preserve_other_entries() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let settings = Settings::new(Storage::with_root(temp.path()));

        settings.set("length_unit", "mm");
        settings.set("show_empty", &true);

        let reopened = Settings::new(Storage::with_root(temp.path()));
        assert_eq!(reopened.get("length_unit", String::new()), "mm");
        assert!(reopened.get("show_empty", false));
    }

    #[test_log::test]
    fn corrupt_file_falls_back() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(store.settings_path(), b"not json").expect("write should succeed");

        assert!(matches!(store.load("x"), Err(StorageError::Serde(_))));

        let settings = Settings::new(store);
        assert_eq!(settings.get("length_unit", "pt".to_owned()), "pt");
        settings.set("length_unit", "cm");
        assert_eq!(settings.get("length_unit", "pt".to_owned()), "cm");
    }

    #[test]
    fn write_replaces_corrupt_file() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = Storage::with_root(temp.path());
        fs::write(store.settings_path(), b"{ \"version\": ").expect("write should succeed");

        store.store("pageruler#length_unit", "\"mm\"".to_owned()).expect("store should succeed");

        let reopened = Storage::with_root(temp.path());
        let loaded = reopened.load("pageruler#length_unit").expect("load should succeed");
        assert_eq!(loaded.as_deref(), Some("\"mm\""));
    }
}
