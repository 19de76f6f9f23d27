//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `QaClient` / `ConversationCatalog` - the HTTP backend
//! - `RealtimeConnector` / `TransportHandler` / `RealtimeChannel` - the push channel
//! - `SnapshotStorage` - local persistence of conversations

mod qa_client;
mod realtime;
mod snapshot_storage;

pub use qa_client::{
    ApiError, ConversationCatalog, ConversationSummary, HealthStatus, QaClient, QaRequest,
    QaResponse, RemoteConversation, RemoteMessage,
};
pub use realtime::{
    LinkEvent, RealtimeChannel, RealtimeConnector, RealtimeLink, TransportError, TransportHandler,
};
pub use snapshot_storage::{ConversationSnapshot, SnapshotStorage, StorageError};
