//! Uploaded dataset storage.
//!
//! Files live flat in one directory, keyed by the client-supplied filename.
//! A second upload with the same name replaces the first. Filenames are
//! untrusted, so anything that could escape the directory is rejected.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::StorageConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid filename '{0}'.")]
    InvalidFilename(String),

    #[error("File '{0}' was not found. Please upload it again.")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Checks that `name` is a plain file name inside the upload directory.
pub fn sanitize_filename(name: &str) -> Result<&str, StorageError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if invalid {
        return Err(StorageError::InvalidFilename(name.to_string()));
    }
    Ok(name)
}

#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: PathBuf,
}

impl DatasetStore {
    /// Opens the store, creating the upload directory if it does not exist.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.upload_dir).inspect_err(|e| {
            error!("Failed to create upload directory {}: {}", config.upload_dir.display(), e);
        })?;
        Ok(Self {
            root: config.upload_dir.clone(),
        })
    }

    pub fn path_for(&self, filename: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(sanitize_filename(filename)?))
    }

    /// Writes `bytes` under `filename`, replacing any previous file of that name.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored upload at {}", path.display());
        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
