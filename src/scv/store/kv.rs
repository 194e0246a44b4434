//! Durable key-value preferences.
//!
//! Holds small opaque values that must survive a restart, such as the selected card
//! reference. Values are plain strings; callers own their encoding.

use super::write_atomic;
use crate::error::{Result, ScvError};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const PREFS_FILENAME: &str = "prefs.json";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Preferences stored as a JSON object in `<root>/prefs.json`.
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.root.join(PREFS_FILENAME)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let path = self.prefs_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path).map_err(ScvError::Io)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// The map to write back. A corrupt file is replaced rather than blocking every
    /// later write.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.load() {
            Err(ScvError::Serialization(e)) => {
                log::warn!("Replacing unreadable {:?}: {}", self.prefs_path(), e);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(map)?;
        write_atomic(&self.root, &self.prefs_path(), &content, "preferences")
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.load_for_write()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// In-memory preferences for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    values: BTreeMap<String, String>,
    simulate_write_error: bool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error {
            return Err(ScvError::persistence("preferences", "Simulated write error"));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_across_instances() {
        let dir = tempdir().unwrap();
        let mut prefs = FileKeyValueStore::new(dir.path());
        assert_eq!(prefs.get("SelectedCardID").unwrap(), None);

        prefs.set("SelectedCardID", "sutta:2").unwrap();
        prefs.set("other", "x").unwrap();

        let reopened = FileKeyValueStore::new(dir.path());
        assert_eq!(
            reopened.get("SelectedCardID").unwrap().as_deref(),
            Some("sutta:2")
        );
    }

    #[test]
    fn remove_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let mut prefs = FileKeyValueStore::new(dir.path());
        prefs.set("a", "1").unwrap();
        prefs.set("b", "2").unwrap();
        prefs.remove("a").unwrap();
        prefs.remove("missing").unwrap();

        assert_eq!(prefs.get("a").unwrap(), None);
        assert_eq!(prefs.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_fails_reads_but_is_replaced_on_write() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PREFS_FILENAME), "garbage").unwrap();
        let mut prefs = FileKeyValueStore::new(dir.path());

        assert!(matches!(
            prefs.get("SelectedCardID"),
            Err(ScvError::Serialization(_))
        ));
        prefs.set("SelectedCardID", "search:1").unwrap();
        assert_eq!(
            prefs.get("SelectedCardID").unwrap().as_deref(),
            Some("search:1")
        );
    }

    #[test]
    fn memory_store_can_fail_writes() {
        let mut prefs = MemoryKeyValueStore::new();
        prefs.set("k", "v").unwrap();
        prefs.set_simulate_write_error(true);
        assert!(prefs.set("k", "w").unwrap_err().is_persistence_failure());
        assert_eq!(prefs.get("k").unwrap().as_deref(), Some("v"));
    }
}
