use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;
use crate::database::repository::{ProjectRepository, QuestionRepository, UserRepository};

/// Errors from the JSON file repositories
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// The three JSON-file repositories backing the API.
#[derive(Clone)]
pub struct DataStore {
    pub users: Arc<UserRepository>,
    pub questions: Arc<QuestionRepository>,
    pub projects: Arc<ProjectRepository>,
    data_dir: PathBuf,
}

impl DataStore {
    /// Load every collection from the configured data directory.
    pub async fn open(storage: &StorageConfig) -> Result<Self, StoreError> {
        tokio::fs::create_dir_all(&storage.data_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: storage.data_dir.clone(),
                source,
            })?;

        let users = UserRepository::open(storage.users_file()).await?;
        let questions = QuestionRepository::open(storage.questions_file()).await?;
        let projects = ProjectRepository::open(storage.projects_file()).await?;

        info!("Data store ready in {}", storage.data_dir.display());

        Ok(Self {
            users: Arc::new(users),
            questions: Arc::new(questions),
            projects: Arc::new(projects),
            data_dir: storage.data_dir.clone(),
        })
    }

    /// Checks the data directory is still present
    pub async fn health_check(&self) -> Result<(), StoreError> {
        let metadata = tokio::fs::metadata(&self.data_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.data_dir.clone(),
                source,
            })?;

        if !metadata.is_dir() {
            return Err(StoreError::Io {
                path: self.data_dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "data path is not a directory"),
            });
        }
        Ok(())
    }
}
