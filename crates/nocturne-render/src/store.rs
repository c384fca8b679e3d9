//! Settings stores.
//!
//! The engine treats settings storage as an external key-value store with
//! change notifications. Only one key matters (by default
//! [`DEFAULT_STORAGE_KEY`](crate::config::DEFAULT_STORAGE_KEY)), and its
//! value is opaque JSON until it passes through
//! [`normalize`](crate::normalize).
//!
//! Two implementations are provided:
//!
//! | Store | Backing | Notifies |
//! |-------|---------|----------|
//! | [`MemoryStore`] | in-process map | on every changing `set`/`remove` |
//! | [`FileStore`] | one JSON object file | on changes made through the same instance |
//!
//! UI consumers mutate settings wholesale with [`update_settings`]: read the
//! blob, normalize, edit, write the whole blob back.
//!
//! ```rust
//! use nocturne_render::{update_settings, MemoryStore, ThemeMode};
//!
//! let store = MemoryStore::new();
//! let settings = update_settings(&store, "nocturne.settings", |s| {
//!     s.set_site_override("example.com", ThemeMode::Dark);
//! })
//! .unwrap();
//! assert_eq!(settings.override_for("example.com"), Some(ThemeMode::Dark));
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ThemeError;
use crate::event::{ListenerId, Listeners};
use crate::theme::{normalize, ThemeSettings};

/// A change notification: `value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    /// The key that changed.
    pub key: String,
    /// The new raw value.
    pub value: Option<Value>,
}

/// A key-value settings store with change subscription.
pub trait SettingsStore {
    /// Reads the raw value under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, ThemeError>;

    /// Writes `value` under `key`.
    fn set(&self, key: &str, value: Value) -> Result<(), ThemeError>;

    /// Deletes `key`.
    fn remove(&self, key: &str) -> Result<(), ThemeError>;

    /// Registers a listener for changes to any key.
    fn subscribe(&self, listener: Box<dyn FnMut(&StoreChange)>) -> ListenerId;

    /// Removes a listener.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

/// Reads and normalizes the settings under `key`. A missing key yields
/// the defaults.
pub fn load_settings<S: SettingsStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<ThemeSettings, ThemeError> {
    Ok(store
        .get(key)?
        .map(|raw| normalize(&raw))
        .unwrap_or_default())
}

/// Read-modify-write of the whole settings blob. Returns the written settings.
pub fn update_settings<S: SettingsStore + ?Sized>(
    store: &S,
    key: &str,
    edit: impl FnOnce(&mut ThemeSettings),
) -> Result<ThemeSettings, ThemeError> {
    let mut settings = load_settings(store, key)?;
    edit(&mut settings);
    store.set(key, settings.to_value())?;
    Ok(settings)
}

// =============================================================================
// MemoryStore
// =============================================================================

/// An in-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Value>>,
    listeners: Listeners<StoreChange>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry.
    pub fn with_entry(key: impl Into<String>, value: Value) -> Self {
        let store = Self::new();
        store.entries.borrow_mut().insert(key.into(), value);
        store
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ThemeError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ThemeError> {
        let previous = self
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        if previous.as_ref() != Some(&value) {
            self.listeners.emit(&StoreChange {
                key: key.to_string(),
                value: Some(value),
            });
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ThemeError> {
        let previous = self.entries.borrow_mut().remove(key);
        if previous.is_some() {
            self.listeners.emit(&StoreChange {
                key: key.to_string(),
                value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self, listener: Box<dyn FnMut(&StoreChange)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// A store persisted as a single JSON object file.
///
/// Each key is a top-level field of the object. A missing file is an empty
/// store. Writes go to a sibling temporary file that is then renamed over
/// the original, so a crash mid-write never leaves a truncated file. A file
/// that is not valid JSON is reported as an error and never overwritten.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    listeners: Listeners<StoreChange>,
}

impl FileStore {
    /// Creates a store backed by `path`. The file is not touched until used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            listeners: Listeners::new(),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, ThemeError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(ThemeError::io(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(entries) => Ok(entries),
            other => Err(ThemeError::config(format!(
                "{}: expected a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ThemeError> {
        let content = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ThemeError::io(parent, e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, content + "\n").map_err(|e| ThemeError::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ThemeError::io(&self.path, e))
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, ThemeError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ThemeError> {
        let mut entries = self.read_entries()?;
        if entries.get(key) == Some(&value) {
            return Ok(());
        }
        entries.insert(key.to_string(), value.clone());
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), key, "settings written");

        self.listeners.emit(&StoreChange {
            key: key.to_string(),
            value: Some(value),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ThemeError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;

        self.listeners.emit(&StoreChange {
            key: key.to_string(),
            value: None,
        });
        Ok(())
    }

    fn subscribe(&self, listener: Box<dyn FnMut(&StoreChange)>) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeMode;
    use serde_json::json;
    use std::rc::Rc;
    use tempfile::TempDir;

    const KEY: &str = "nocturne.settings";

    fn recorder(store: &dyn SettingsStore) -> Rc<RefCell<Vec<StoreChange>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Box::new(move |change: &StoreChange| {
            sink.borrow_mut().push(change.clone())
        }));
        seen
    }

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(KEY).unwrap(), None);

        store.set(KEY, json!({"defaultMode": "dark"})).unwrap();
        assert_eq!(store.get(KEY).unwrap(), Some(json!({"defaultMode": "dark"})));

        store.remove(KEY).unwrap();
        assert_eq!(store.get(KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store_notifies_changes_only() {
        let store = MemoryStore::new();
        let seen = recorder(&store);

        store.set(KEY, json!(1)).unwrap();
        store.set(KEY, json!(1)).unwrap();
        store.remove(KEY).unwrap();
        store.remove(KEY).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].value, Some(json!(1)));
        assert_eq!(seen[1].value, None);
    }

    #[test]
    fn test_load_settings_missing_key_is_default() {
        let store = MemoryStore::new();
        assert_eq!(load_settings(&store, KEY).unwrap(), ThemeSettings::default());
    }

    #[test]
    fn test_load_settings_normalizes() {
        let store = MemoryStore::with_entry(KEY, json!("garbage"));
        assert_eq!(load_settings(&store, KEY).unwrap(), ThemeSettings::default());
    }

    #[test]
    fn test_update_settings_writes_whole_blob() {
        let store = MemoryStore::with_entry(
            KEY,
            json!({ "defaultMode": "light", "siteOverrides": { "a.example": "bogus" } }),
        );
        update_settings(&store, KEY, |s| {
            s.enable_site("b.example");
        })
        .unwrap();

        assert_eq!(
            store.get(KEY).unwrap(),
            Some(json!({ "defaultMode": "light", "siteOverrides": { "b.example": "light" } }))
        );
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("settings.json"));
        assert_eq!(store.get(KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_round_trip_and_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"other.key": 5}"#).unwrap();

        let store = FileStore::new(&path);
        update_settings(&store, KEY, |s| {
            s.set_site_override("example.com", ThemeMode::Dark);
        })
        .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("other.key").unwrap(), Some(json!(5)));
        assert_eq!(
            load_settings(&reopened, KEY)
                .unwrap()
                .override_for("example.com"),
            Some(ThemeMode::Dark)
        );
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("a").join("b").join("s.json"));
        store.set(KEY, json!({})).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_notifies() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("settings.json"));
        let seen = recorder(&store);

        store.set(KEY, json!({"defaultMode": "dark"})).unwrap();
        store.set(KEY, json!({"defaultMode": "dark"})).unwrap();
        store.remove(KEY).unwrap();

        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(KEY), Err(ThemeError::Json(_))));
        assert!(store.set(KEY, json!({})).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_file_store_rejects_non_object_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = FileStore::new(&path).get(KEY).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
