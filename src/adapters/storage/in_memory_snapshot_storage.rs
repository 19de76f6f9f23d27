//! In-Memory Snapshot Storage Adapter
//!
//! Keeps the snapshot in memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{ConversationSnapshot, SnapshotStorage, StorageError};

/// In-memory storage for the conversation snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStorage {
    snapshot: Arc<RwLock<Option<ConversationSnapshot>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemorySnapshotStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-loaded with a snapshot
    pub fn with_snapshot(snapshot: ConversationSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail with an IO error
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The last saved snapshot
    pub async fn stored(&self) -> Option<ConversationSnapshot> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStorage for InMemorySnapshotStorage {
    async fn load(&self) -> Result<Option<ConversationSnapshot>, StorageError> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &ConversationSnapshot) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.snapshot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_returns_snapshot() {
        let storage = InMemorySnapshotStorage::new();
        assert!(storage.load().await.unwrap().is_none());

        storage.save(&ConversationSnapshot::default()).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), Some(ConversationSnapshot::default()));
        assert_eq!(storage.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_leave_previous_snapshot() {
        let storage = InMemorySnapshotStorage::with_snapshot(ConversationSnapshot::default());
        storage.fail_saves(true);

        assert!(storage.save(&ConversationSnapshot::default()).await.is_err());
        assert_eq!(storage.save_count(), 0);
        assert!(storage.stored().await.is_some());
    }
}
