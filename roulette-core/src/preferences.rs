//! Persisted user preferences
//!
//! The preferred filter survives between runs. Sessions receive a store
//! explicitly; the JSON file store is what the CLI uses.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PreferenceError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Last filter key chosen by the user, unvalidated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Reader/writer for [`Preferences`]
pub trait PreferenceStore: Send {
    fn load(&self) -> Result<Preferences, PreferenceError>;

    fn save(&mut self, preferences: &Preferences) -> Result<(), PreferenceError>;
}

/// Keeps preferences in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    preferences: Preferences,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            preferences: Preferences {
                filter: Some(filter.into()),
            },
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences, PreferenceError> {
        Ok(self.preferences.clone())
    }

    fn save(&mut self, preferences: &Preferences) -> Result<(), PreferenceError> {
        self.preferences = preferences.clone();
        Ok(())
    }
}

/// Stores preferences as pretty JSON at a fixed path
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    /// A missing file yields default preferences
    fn load(&self) -> Result<Preferences, PreferenceError> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Creates parent directories if needed
    fn save(&mut self, preferences: &Preferences) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonPreferenceStore::new(dir.path().join("preferences.json"));
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let mut store = JsonPreferenceStore::new(dir.path().join("nested/preferences.json"));
        let prefs = Preferences {
            filter: Some("web".to_string()),
        };

        store.save(&prefs).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), prefs);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonPreferenceStore::new(path);
        assert!(matches!(
            store.load(),
            Err(PreferenceError::Serialization(_))
        ));
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryPreferenceStore::with_filter("app");
        assert_eq!(store.load().unwrap().filter.as_deref(), Some("app"));

        store.save(&Preferences::default()).unwrap();
        assert!(store.load().unwrap().filter.is_none());
    }
}
