//! Real-time Ports - Interfaces around the push channel.
//!
//! - [`RealtimeConnector`] opens one physical connection and hands back a
//!   [`RealtimeLink`] (a pair of text channels)
//! - [`TransportHandler`] receives the transport's callbacks, always from a
//!   single task and in arrival order
//! - [`RealtimeChannel`] is what callers use to send frames

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::domain::foundation::{ConversationId, MessageId};
use crate::domain::realtime::{kinds, ConnectionPhase, Frame, Subscription};

/// Errors raised by the physical connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The URL can never be connected to; retrying is pointless.
    #[error("Invalid real-time URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    ConnectFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    Closed,
}

impl TransportError {
    /// Whether the bounded retry loop may try again after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransportError::InvalidUrl(_))
    }
}

/// Event read from an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A text message.
    Text(String),
    /// A transport-level error that did not close the connection.
    Error(String),
    /// The peer or the network closed the connection.
    Closed,
}

/// An open connection, as two channels.
///
/// Dropping `outbound` closes the connection.
#[derive(Debug)]
pub struct RealtimeLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<LinkEvent>,
}

/// Port for opening physical connections.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    /// Opens a connection to `url`.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for URLs that can never work; anything else for failures
    /// worth retrying.
    async fn connect(&self, url: &str) -> Result<RealtimeLink, TransportError>;
}

/// Callbacks fired by the transport.
///
/// All callbacks run on the transport's own task, one at a time.
#[async_trait]
pub trait TransportHandler: Send + Sync {
    async fn on_open(&self) {}

    async fn on_close(&self) {}

    async fn on_error(&self, _error: &TransportError) {}

    /// Called exactly once per valid inbound frame, in arrival order.
    async fn on_message(&self, frame: Frame);
}

/// Port for sending frames over the real-time connection.
pub trait RealtimeChannel: Send + Sync {
    /// Current connection phase.
    fn phase(&self) -> ConnectionPhase;

    /// Sends `{type, data, timestamp: now}` if the connection is open.
    ///
    /// Returns whether the frame was accepted. Nothing is queued while the
    /// connection is not open.
    fn send(&self, kind: &str, data: Value) -> bool;

    fn is_open(&self) -> bool {
        self.phase().is_open()
    }

    fn subscribe(&self, subscription: &Subscription) -> bool {
        self.send(kinds::SUBSCRIBE, subscription.subscribe_data())
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.send(kinds::UNSUBSCRIBE, subscription.unsubscribe_data())
    }

    fn subscribe_to_conversation(&self, id: &ConversationId) -> bool {
        self.subscribe(&Subscription::Conversation(id.clone()))
    }

    fn subscribe_to_message(&self, id: &MessageId) -> bool {
        self.subscribe(&Subscription::MessageProcessing(id.clone()))
    }
}
