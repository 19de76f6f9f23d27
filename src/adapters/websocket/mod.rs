//! WebSocket adapters for the real-time transparency channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     ReconnectingTransport                           │
//! │   - Actor task: phase, bounded retry, heartbeat                     │
//! │   - Parses inbound text into Frames                                 │
//! │   - Fires TransportHandler callbacks in receipt order               │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ RealtimeConnector::connect
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   TungsteniteConnector (production) │ MockConnector (test)          │
//! │   - Reader/writer pumps behind a RealtimeLink                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod mock_connector;
mod transport;
mod tungstenite_connector;

pub use mock_connector::{ConnectOutcome, MockConnector, MockLinkHandle};
pub use transport::{ReconnectingTransport, TransportConfig, TransportStatus};
pub use tungstenite_connector::TungsteniteConnector;
