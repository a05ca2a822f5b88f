use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::database::manager::StoreError;

/// One JSON array file kept resident in memory.
///
/// All access goes through this type: readers share the lock, and every
/// mutation holds the write lock across read-modify-write-persist so two
/// concurrent writers can never lose each other's update. The new contents
/// only replace the resident copy once they are on disk.
pub struct JsonCollection<T> {
    name: &'static str,
    path: PathBuf,
    records: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Load `path`; a missing or empty file is an empty collection.
    pub async fn open(name: &'static str, path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let records: Vec<T> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} file {} does not exist yet", name, path.display());
                Vec::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        info!("Loaded {} {} from {}", records.len(), name, path.display());

        Ok(Self {
            name,
            path,
            records: RwLock::new(records),
        })
    }

    /// Clone of the full collection in file order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.records.read().await.iter().find(|r| predicate(r)).cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Apply `change` to a copy of the collection and rewrite the whole file.
    ///
    /// If `change` fails nothing is written. If the write fails the error is
    /// logged and returned, and the resident collection is left untouched.
    pub async fn mutate<R, F>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let mut guard = self.records.write().await;
        let mut next = guard.clone();
        let outcome = change(&mut next)?;

        if let Err(e) = write_atomically(&self.path, &next).await {
            error!("Failed to persist {} to {}: {}", self.name, self.path.display(), e);
            return Err(e);
        }

        *guard = next;
        Ok(outcome)
    }
}

async fn write_atomically<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(records)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection.json".to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    tokio::fs::write(&tmp, &body)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;

    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
