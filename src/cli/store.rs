use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HOME environment variable not set")]
    NoHome,
}

/// String key/value persistence for client-side session state.
///
/// `FileStore` keeps it on disk between CLI invocations; `MemoryStore` is
/// for tests and embedding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Directory holding the CLI's state files.
///
/// `PORTAL_CLI_CONFIG_DIR` when set, otherwise `~/.config/portal/cli`.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    if let Ok(custom_dir) = std::env::var("PORTAL_CLI_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }
    let home = std::env::var("HOME").map_err(|_| StorageError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("portal").join("cli"))
}

/// One JSON object file of string values
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` in the CLI config directory
    pub fn from_env() -> Result<Self, StorageError> {
        Ok(Self::new(config_dir()?.join("session.json")))
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Unparseable contents are discarded so a fresh login can overwrite them
    fn load_or_reset(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!("Discarding unreadable store file {}: {}", path.display(), source);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(values).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.load_or_reset()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut values = self.load_or_reset()?;
        values.remove(key);
        self.save(&values)
    }
}

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
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut store = FileStore::new(&path);
        assert_eq!(store.get("session").unwrap(), None);
        store.set("session", "{\"token\":\"abc\"}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("session").unwrap().as_deref(), Some("{\"token\":\"abc\"}"));
    }

    #[test]
    fn file_store_remove_clears_key() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("session.json"));
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_reports_error_and_is_replaced_on_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let mut store = FileStore::new(&path);
        assert!(matches!(store.get("session"), Err(StorageError::Corrupt { .. })));

        store.set("session", "fresh").unwrap();
        assert_eq!(store.get("session").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
