//! Local snapshot storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the conversation snapshot is kept
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot file
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Snapshot key; the file is `<directory>/<key>.json`
    #[serde(default = "default_key")]
    pub key: String,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("storage.key"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            key: default_key(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("./data")
}

fn default_key() -> String {
    "chat-storage".to_string()
}
