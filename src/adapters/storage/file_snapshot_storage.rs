//! File-based Snapshot Storage Adapter
//!
//! Stores the conversation snapshot as one JSON file, `<directory>/<key>.json`.
//! Writes go to a sibling temp file first and are renamed into place so a
//! crash never leaves a half-written snapshot. A snapshot that cannot be
//! decoded is moved to `<key>.json.corrupt` so later saves cannot overwrite it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{ConversationSnapshot, SnapshotStorage, StorageError};

/// File-based storage for the conversation snapshot
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    directory: PathBuf,
    key: String,
}

impl FileSnapshotStorage {
    /// Create a storage writing `<directory>/<key>.json`
    pub fn new<P: AsRef<Path>>(directory: P, key: impl Into<String>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Path of the snapshot file
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(format!("{}.json", self.key))
    }

    /// Where an undecodable snapshot is set aside
    pub fn corrupt_path(&self) -> PathBuf {
        self.directory.join(format!("{}.json.corrupt", self.key))
    }

    fn temp_path(&self) -> PathBuf {
        self.directory.join(format!("{}.json.tmp", self.key))
    }

    async fn set_aside(&self) {
        let from = self.file_path();
        let to = self.corrupt_path();
        match fs::rename(&from, &to).await {
            Ok(()) => tracing::warn!(path = %to.display(), "unreadable snapshot set aside"),
            Err(e) => tracing::warn!(path = %from.display(), error = %e, "could not set aside unreadable snapshot"),
        }
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStorage for FileSnapshotStorage {
    async fn load(&self) -> Result<Option<ConversationSnapshot>, StorageError> {
        let json = match fs::read_to_string(self.file_path()).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                self.set_aside().await;
                Err(StorageError::Deserialization(e.to_string()))
            }
        }
    }

    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&temp, self.file_path())
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(self.file_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}
