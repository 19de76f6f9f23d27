//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `http` - reqwest client for the question-answering backend
//! - `qa` - mock QA client
//! - `storage` - snapshot persistence (file, in-memory)
//! - `websocket` - reconnecting real-time transport and connectors

pub mod http;
pub mod qa;
pub mod storage;
pub mod websocket;

pub use http::HttpQaClient;
pub use qa::MockQaClient;
pub use storage::{FileSnapshotStorage, InMemorySnapshotStorage};
pub use websocket::{
    MockConnector, ReconnectingTransport, TransportConfig, TransportStatus, TungsteniteConnector,
};
