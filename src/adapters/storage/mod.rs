//! Storage Adapters
//!
//! Implementations of the SnapshotStorage port for persisting conversations.
//!
//! ## Available Adapters
//!
//! - **FileSnapshotStorage** - Stores the snapshot as a JSON file on disk
//! - **InMemorySnapshotStorage** - Stores the snapshot in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSnapshotStorage, InMemorySnapshotStorage};
//!
//! // Production: `<directory>/<key>.json`
//! let storage = FileSnapshotStorage::new("./data", "chat-storage");
//!
//! // Testing: in-memory storage
//! let storage = InMemorySnapshotStorage::new();
//! ```

mod file_snapshot_storage;
mod in_memory_snapshot_storage;

pub use file_snapshot_storage::FileSnapshotStorage;
pub use in_memory_snapshot_storage::InMemorySnapshotStorage;
