//! ChatSession - wires the ports together for one running client.
//!
//! The session owns the transport, the conversation store and the
//! orchestrator, and shares the transparency state with whoever renders it.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::adapters::http::HttpQaClient;
use crate::adapters::storage::FileSnapshotStorage;
use crate::adapters::websocket::{ReconnectingTransport, TransportConfig, TungsteniteConnector};
use crate::application::conversation_store::{ConversationStore, SharedConversationStore};
use crate::application::handlers::{
    AskQuestionCommand, AskQuestionHandler, AskQuestionResult, ExchangeStatus,
};
use crate::application::transparency::SharedTransparency;
use crate::application::update_router::{ProgressPolicy, UpdateRouter};
use crate::config::{self, AppConfig};
use crate::domain::foundation::ConversationId;
use crate::ports::{ApiError, ConversationCatalog, QaClient, RealtimeConnector, SnapshotStorage};

/// Errors that prevent a session from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ValidationError),

    #[error("Backend client error: {0}")]
    Api(#[from] ApiError),
}

/// The adapters a session runs on.
pub struct SessionPorts {
    pub qa: Arc<dyn QaClient>,
    pub catalog: Option<Arc<dyn ConversationCatalog>>,
    pub connector: Arc<dyn RealtimeConnector>,
    pub storage: Arc<dyn SnapshotStorage>,
}

/// A running chat client.
pub struct ChatSession {
    transparency: SharedTransparency,
    transport: Arc<ReconnectingTransport>,
    store: SharedConversationStore,
    catalog: Option<Arc<dyn ConversationCatalog>>,
    ask: AskQuestionHandler,
}

impl ChatSession {
    /// Starts a session on the process-wide transparency state.
    pub async fn start(config: &AppConfig) -> Result<Self, SessionError> {
        Self::start_with(config, SharedTransparency::global()).await
    }

    /// Starts a session with the production adapters.
    pub async fn start_with(
        config: &AppConfig,
        transparency: SharedTransparency,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let http = Arc::new(HttpQaClient::new(&config.api.base_url, config.api.timeout())?);
        let ports = SessionPorts {
            qa: http.clone(),
            catalog: Some(http),
            connector: Arc::new(TungsteniteConnector::new()),
            storage: Arc::new(FileSnapshotStorage::new(
                &config.storage.directory,
                config.storage.key.clone(),
            )),
        };

        let transport = TransportConfig {
            url: config.realtime_url()?.to_string(),
            reconnect: config.realtime.reconnect,
            max_reconnect_attempts: config.realtime.reconnect_attempts,
            reconnect_interval: config.realtime.reconnect_interval(),
            heartbeat_interval: config.realtime.heartbeat(),
            ..TransportConfig::default()
        };
        let policy = if config.realtime.monotonic_progress {
            ProgressPolicy::Monotonic
        } else {
            ProgressPolicy::Verbatim
        };

        Ok(Self::assemble(ports, transport, transparency, policy).await)
    }

    /// Builds a session from explicit adapters and connects the transport.
    pub async fn assemble(
        ports: SessionPorts,
        transport: TransportConfig,
        transparency: SharedTransparency,
        policy: ProgressPolicy,
    ) -> Self {
        let store = match ConversationStore::load(ports.storage.clone()).await {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "could not restore conversations, starting empty");
                ConversationStore::new(ports.storage.clone())
            }
        }
        .shared();

        let router = Arc::new(UpdateRouter::new(transparency.clone()).with_policy(policy));
        let transport = Arc::new(ReconnectingTransport::spawn(
            ports.connector,
            transport,
            router,
        ));
        transport.connect();

        let ask = AskQuestionHandler::new(
            ports.qa,
            store.clone(),
            transparency.clone(),
            transport.clone(),
        );

        Self {
            transparency,
            transport,
            store,
            catalog: ports.catalog,
            ask,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn transparency(&self) -> &SharedTransparency {
        &self.transparency
    }

    pub fn transport(&self) -> &ReconnectingTransport {
        &self.transport
    }

    pub fn store(&self) -> &SharedConversationStore {
        &self.store
    }

    /// Auxiliary backend calls, when the backend supports them.
    pub fn catalog(&self) -> Option<&Arc<dyn ConversationCatalog>> {
        self.catalog.as_ref()
    }

    pub fn exchange_status(&self) -> watch::Receiver<ExchangeStatus> {
        self.ask.watch_status()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs one question-answer exchange.
    pub async fn ask(&self, question: impl Into<String>) -> AskQuestionResult {
        self.ask.handle(AskQuestionCommand::new(question)).await
    }

    /// Starts a fresh conversation and makes it current.
    pub async fn new_conversation(&self) -> ConversationId {
        self.store.write().await.create_conversation().await
    }

    /// Deletes all local conversations, in memory and on disk.
    pub async fn clear_history(&self) {
        self.store.write().await.clear_all().await;
    }

    /// Closes the real-time connection and stops reconnecting.
    pub fn shutdown(&self) {
        self.transport.disconnect();
    }
}
