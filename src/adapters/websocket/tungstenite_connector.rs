//! WebSocket connector over tokio-tungstenite.
//!
//! Each connection is split into a reader and a writer task that pump text
//! frames between the socket and the two channels of a [`RealtimeLink`].

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

use crate::ports::{LinkEvent, RealtimeConnector, RealtimeLink, TransportError};

/// Opens real WebSocket connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

fn validate_url(url: &str) -> Result<(), TransportError> {
    let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(TransportError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

fn map_connect_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::Url(e) => TransportError::InvalidUrl(e.to_string()),
        tungstenite::Error::Http(response) => {
            TransportError::ConnectFailed(format!("handshake rejected with HTTP {}", response.status()))
        }
        other => TransportError::ConnectFailed(other.to_string()),
    }
}

#[async_trait]
impl RealtimeConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<RealtimeLink, TransportError> {
        validate_url(url)?;

        let (ws, _) = connect_async(url).await.map_err(map_connect_error)?;
        let (mut sink, mut stream) = ws.split();

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel::<LinkEvent>();

        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::debug!(error = %e, "websocket write failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(LinkEvent::Text(text.as_str().to_owned())).is_err() {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    // Pings are answered by tungstenite itself.
                    Ok(_) => {}
                    Err(e) => {
                        let _ = inbound_tx.send(LinkEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = inbound_tx.send(LinkEvent::Closed);
        });

        Ok(RealtimeLink { outbound, inbound })
    }
}
