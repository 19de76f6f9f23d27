//! Snapshot Storage Port - Interface for persisting the conversation store.
//!
//! The whole store is written as one keyed blob after every mutation and read
//! back once at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::Conversation;

/// Errors that can occur during snapshot storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),

    #[error("Failed to deserialize snapshot: {0}")]
    Deserialization(String),
}

/// The persisted blob: `{conversations, currentConversation}`.
///
/// Dates are RFC 3339 strings on disk and date values once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub current_conversation: Option<Conversation>,
}

/// Port for persisting the conversation snapshot.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Loads the snapshot, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<ConversationSnapshot>, StorageError>;

    /// Replaces the stored snapshot.
    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), StorageError>;

    /// Removes the stored snapshot. Missing snapshots are not an error.
    async fn clear(&self) -> Result<(), StorageError>;
}
