//! Reconnecting transport - one logical real-time connection with bounded retry.
//!
//! The transport is an actor task that owns the physical connection, the
//! retry timer and the heartbeat. Callers talk to it through a command
//! channel and observe it through a watch channel; every
//! [`TransportHandler`] callback runs on the actor task, so inbound frames
//! are handled strictly in receipt order.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──connect──► Connecting ──ok──► Open ──drop──► Closed ──retry──► Connecting
//!                        │                               ▲
//!                        ├──────── refused ──────────────┘
//!                        └──────── invalid url ────────► Failed
//! ```
//!
//! Retries use a fixed interval and stop after `max_reconnect_attempts`
//! consecutive failures. A successful open resets the counter.

use serde_json::Value;
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};

use crate::domain::realtime::{kinds, ConnectionPhase, Frame};
use crate::ports::{
    LinkEvent, RealtimeChannel, RealtimeConnector, RealtimeLink, TransportError, TransportHandler,
};

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Whether unexpected closes trigger automatic reconnection.
    pub reconnect: bool,
    pub max_reconnect_attempts: u32,
    /// Fixed delay before each automatic attempt.
    pub reconnect_interval: Duration,
    /// Upper bound on a single connection attempt.
    pub connect_timeout: Duration,
    /// Period of `ping` frames while open; `None` disables them.
    pub heartbeat_interval: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8001/ws".to_string(),
            reconnect: true,
            max_reconnect_attempts: 5,
            reconnect_interval: Duration::from_millis(3000),
            connect_timeout: Duration::from_secs(10),
            heartbeat_interval: None,
        }
    }
}

/// Observable state of the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStatus {
    pub phase: ConnectionPhase,
    /// Automatic attempts made since the last successful open.
    pub reconnect_attempts: u32,
    pub last_error: Option<String>,
}

#[derive(Debug)]
enum Command {
    Connect,
    Disconnect,
    Send(String),
    SetReconnect(bool),
}

/// Handle to the transport actor.
///
/// Dropping the handle stops the actor and closes the connection.
#[derive(Debug)]
pub struct ReconnectingTransport {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<TransportStatus>,
}

impl ReconnectingTransport {
    /// Spawns the actor. No connection is made until [`connect`](Self::connect).
    pub fn spawn(
        connector: Arc<dyn RealtimeConnector>,
        config: TransportConfig,
        handler: Arc<dyn TransportHandler>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(TransportStatus::default());

        let actor = Actor {
            reconnect: config.reconnect,
            connector,
            handler,
            config,
            status: status_tx,
            link: None,
            retry: None,
        };
        tokio::spawn(actor.run(command_rx));

        Self { commands, status }
    }

    /// Opens the connection unless it is already open or connecting.
    pub fn connect(&self) {
        self.command(Command::Connect);
    }

    /// Disables automatic reconnection, cancels any pending retry and closes
    /// the connection. Idempotent.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Toggles automatic reconnection.
    pub fn set_reconnect(&self, enabled: bool) {
        self.command(Command::SetReconnect(enabled));
    }

    /// Current status snapshot.
    pub fn status(&self) -> TransportStatus {
        self.status.borrow().clone()
    }

    /// A receiver notified on every status change.
    pub fn watch_status(&self) -> watch::Receiver<TransportStatus> {
        self.status.clone()
    }

    /// Waits until the transport reaches `phase`.
    ///
    /// Returns false if the actor stopped first.
    pub async fn wait_for_phase(&self, phase: ConnectionPhase) -> bool {
        let mut status = self.status.clone();
        let reached = status.wait_for(|s| s.phase == phase).await.is_ok();
        reached
    }

    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("transport actor has stopped");
        }
    }
}

impl RealtimeChannel for ReconnectingTransport {
    fn phase(&self) -> ConnectionPhase {
        self.status.borrow().phase
    }

    fn send(&self, kind: &str, data: Value) -> bool {
        if !self.is_open() {
            tracing::debug!(frame_type = kind, "not sending frame, connection not open");
            return false;
        }
        match Frame::new(kind, data).to_json() {
            Ok(text) => self.commands.send(Command::Send(text)).is_ok(),
            Err(e) => {
                tracing::warn!(frame_type = kind, error = %e, "failed to encode frame");
                false
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Actor
// ════════════════════════════════════════════════════════════════════════════════

struct Actor {
    connector: Arc<dyn RealtimeConnector>,
    handler: Arc<dyn TransportHandler>,
    config: TransportConfig,
    reconnect: bool,
    status: watch::Sender<TransportStatus>,
    link: Option<RealtimeLink>,
    retry: Option<Pin<Box<Sleep>>>,
}

impl Actor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut heartbeat = self.config.heartbeat_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = next_link_event(&mut self.link) => {
                    self.handle_link_event(event).await;
                }
                _ = wait_retry(&mut self.retry) => {
                    self.retry = None;
                    tracing::info!(
                        attempt = self.status.borrow().reconnect_attempts,
                        "reconnecting"
                    );
                    self.open().await;
                }
                _ = next_tick(&mut heartbeat) => {
                    if self.phase() == ConnectionPhase::Open {
                        if let Ok(ping) = Frame::new(kinds::PING, Value::Null).to_json() {
                            self.write(ping);
                        }
                    }
                }
            }
        }

        self.link = None;
        tracing::debug!("transport actor stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.open().await,
            Command::Disconnect => self.disconnect().await,
            Command::Send(text) => self.write(text),
            Command::SetReconnect(enabled) => {
                self.reconnect = enabled;
                if !enabled {
                    self.retry = None;
                }
            }
        }
    }

    async fn handle_link_event(&mut self, event: Option<LinkEvent>) {
        match event {
            Some(LinkEvent::Text(text)) => match Frame::parse(&text) {
                Ok(frame) => {
                    tracing::trace!(frame_type = %frame.kind, "frame received");
                    self.handler.on_message(frame).await;
                }
                Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
            },
            Some(LinkEvent::Error(message)) => {
                let err = TransportError::Protocol(message);
                tracing::warn!(error = %err, "transport error");
                self.record_error(&err);
                self.handler.on_error(&err).await;
            }
            Some(LinkEvent::Closed) | None => self.closed().await,
        }
    }

    fn phase(&self) -> ConnectionPhase {
        self.status.borrow().phase
    }

    fn set_phase(&self, phase: ConnectionPhase) {
        self.status.send_modify(|s| s.phase = phase);
    }

    fn record_error(&self, err: &TransportError) {
        let message = err.to_string();
        self.status.send_modify(|s| s.last_error = Some(message));
    }

    async fn open(&mut self) {
        if self.phase().is_live() {
            tracing::debug!(phase = %self.phase(), "connect ignored");
            return;
        }
        self.retry = None;
        self.set_phase(ConnectionPhase::Connecting);
        tracing::info!(url = %self.config.url, "connecting");

        let attempt = time::timeout(
            self.config.connect_timeout,
            self.connector.connect(&self.config.url),
        )
        .await
        .unwrap_or_else(|_| {
            Err(TransportError::ConnectFailed(format!(
                "timed out after {}ms",
                self.config.connect_timeout.as_millis()
            )))
        });

        match attempt {
            Ok(link) => {
                self.link = Some(link);
                self.status.send_modify(|s| {
                    s.phase = ConnectionPhase::Open;
                    s.reconnect_attempts = 0;
                    s.last_error = None;
                });
                tracing::info!(url = %self.config.url, "connection open");
                self.handler.on_open().await;
            }
            Err(err) if !err.is_recoverable() => {
                tracing::warn!(error = %err, "connection failed permanently");
                self.record_error(&err);
                self.set_phase(ConnectionPhase::Failed);
                self.handler.on_error(&err).await;
            }
            Err(err) => {
                tracing::info!(error = %err, "connection attempt failed");
                self.record_error(&err);
                self.handler.on_error(&err).await;
                self.closed().await;
            }
        }
    }

    async fn closed(&mut self) {
        self.link = None;
        self.set_phase(ConnectionPhase::Closed);
        tracing::info!("connection closed");
        self.handler.on_close().await;
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        if !self.reconnect {
            return;
        }
        let attempts = self.status.borrow().reconnect_attempts;
        let max = self.config.max_reconnect_attempts;
        if attempts >= max {
            tracing::warn!(attempts, "reconnect attempts exhausted");
            return;
        }

        self.status.send_modify(|s| s.reconnect_attempts += 1);
        tracing::info!(
            attempt = attempts + 1,
            max,
            delay_ms = self.config.reconnect_interval.as_millis() as u64,
            "scheduling reconnect"
        );
        self.retry = Some(Box::pin(time::sleep(self.config.reconnect_interval)));
    }

    async fn disconnect(&mut self) {
        self.reconnect = false;
        self.retry = None;
        if self.link.take().is_some() {
            self.set_phase(ConnectionPhase::Closed);
            tracing::info!("disconnected");
            self.handler.on_close().await;
        }
    }

    fn write(&mut self, text: String) {
        match &self.link {
            Some(link) => {
                if link.outbound.send(text).is_err() {
                    tracing::debug!("dropping frame, writer has stopped");
                }
            }
            None => tracing::debug!("dropping frame, connection not open"),
        }
    }
}

async fn next_link_event(link: &mut Option<RealtimeLink>) -> Option<LinkEvent> {
    match link {
        Some(link) => link.inbound.recv().await,
        None => pending().await,
    }
}

async fn wait_retry(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}
