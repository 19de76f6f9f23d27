//! Mock connector for testing the transport without a network.
//!
//! Connection attempts follow a script of outcomes; accepted attempts hand
//! the test a [`MockLinkHandle`] to push server events and read client frames.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::ports::{LinkEvent, RealtimeConnector, RealtimeLink, TransportError};

/// Outcome of one scripted connection attempt.
#[derive(Debug, Clone)]
pub enum ConnectOutcome {
    Accept,
    Refuse(TransportError),
}

/// Server side of an accepted mock connection.
#[derive(Debug)]
pub struct MockLinkHandle {
    to_client: mpsc::UnboundedSender<LinkEvent>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl MockLinkHandle {
    /// Pushes a text frame to the client.
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.to_client.send(LinkEvent::Text(text.into()));
    }

    /// Reports a transport error without closing.
    pub fn push_error(&self, error: impl Into<String>) {
        let _ = self.to_client.send(LinkEvent::Error(error.into()));
    }

    /// Closes the connection from the server side.
    pub fn close(&self) {
        let _ = self.to_client.send(LinkEvent::Closed);
    }

    /// Waits for the next frame the client sends.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Drains the frames sent so far.
    pub fn sent(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(text) = self.from_client.try_recv() {
            frames.push(text);
        }
        frames
    }

    /// Whether the client has dropped the connection.
    pub fn is_closed_by_client(&self) -> bool {
        self.to_client.is_closed()
    }
}

/// Scripted connector.
///
/// When the script runs out, every attempt gets the fallback outcome.
#[derive(Debug, Clone)]
pub struct MockConnector {
    script: Arc<Mutex<VecDeque<ConnectOutcome>>>,
    fallback: ConnectOutcome,
    attempts: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
    links: Arc<Mutex<VecDeque<MockLinkHandle>>>,
}

impl MockConnector {
    /// A connector that refuses every attempt.
    pub fn refusing() -> Self {
        Self::with_fallback(ConnectOutcome::Refuse(TransportError::ConnectFailed(
            "connection refused".to_string(),
        )))
    }

    /// A connector that accepts every attempt.
    pub fn accepting() -> Self {
        Self::with_fallback(ConnectOutcome::Accept)
    }

    fn with_fallback(fallback: ConnectOutcome) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            attempts: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
            links: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queues an outcome; queued outcomes are used before the fallback.
    pub fn then(self, outcome: ConnectOutcome) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// Number of connection attempts so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// URLs of all attempts.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// Takes the oldest accepted connection not yet taken.
    pub fn take_link(&self) -> Option<MockLinkHandle> {
        self.links.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl RealtimeConnector for MockConnector {
    async fn connect(&self, url: &str) -> Result<RealtimeLink, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            ConnectOutcome::Accept => {
                let (outbound, from_client) = mpsc::unbounded_channel();
                let (to_client, inbound) = mpsc::unbounded_channel();
                self.links.lock().unwrap().push_back(MockLinkHandle {
                    to_client,
                    from_client,
                });
                Ok(RealtimeLink { outbound, inbound })
            }
            ConnectOutcome::Refuse(err) => Err(err),
        }
    }
}
