//! AskQuestionHandler - coordinates one user-initiated exchange.
//!
//! The synchronous answer call is authoritative for ending the loading
//! state. Pushed transparency frames drive the stage display independently
//! and may arrive before, during or after the call resolves.

use std::sync::Arc;
use tokio::sync::watch;

use crate::application::conversation_store::SharedConversationStore;
use crate::application::transparency::SharedTransparency;
use crate::domain::conversation::MessageRole;
use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::{ApiError, QaClient, QaRequest, RealtimeChannel};

/// Command to ask a question in the current conversation.
#[derive(Debug, Clone)]
pub struct AskQuestionCommand {
    pub question: String,
}

impl AskQuestionCommand {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Result of an exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum AskQuestionResult {
    /// Blank question; nothing happened.
    Ignored,
    /// The backend answered.
    Answered {
        conversation_id: ConversationId,
        message_id: MessageId,
        answer: String,
    },
    /// The call failed; the error is also in [`ExchangeStatus::error`].
    Failed(ApiError),
}

/// Loading flag and last user-visible error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Handler for asking questions.
pub struct AskQuestionHandler {
    client: Arc<dyn QaClient>,
    store: SharedConversationStore,
    transparency: SharedTransparency,
    channel: Arc<dyn RealtimeChannel>,
    status: watch::Sender<ExchangeStatus>,
}

impl AskQuestionHandler {
    pub fn new(
        client: Arc<dyn QaClient>,
        store: SharedConversationStore,
        transparency: SharedTransparency,
        channel: Arc<dyn RealtimeChannel>,
    ) -> Self {
        let (status, _) = watch::channel(ExchangeStatus::default());
        Self {
            client,
            store,
            transparency,
            channel,
            status,
        }
    }

    /// Current loading flag and error.
    pub fn status(&self) -> ExchangeStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<ExchangeStatus> {
        self.status.subscribe()
    }

    /// Clears the last error without touching the loading flag.
    pub fn clear_error(&self) {
        self.status.send_if_modified(|status| status.error.take().is_some());
    }

    pub async fn handle(&self, cmd: AskQuestionCommand) -> AskQuestionResult {
        if cmd.question.trim().is_empty() {
            return AskQuestionResult::Ignored;
        }
        let question = cmd.question;

        // 1. Reset error, enter loading
        self.status.send_replace(ExchangeStatus {
            is_loading: true,
            error: None,
        });

        // 2. Record the question in the current conversation
        let local_id = {
            let mut store = self.store.write().await;
            let id = store.ensure_current().await;
            store.append_message(&id, MessageRole::User, question.as_str()).await;
            id
        };

        // 3. Open the stage display and follow pushed updates
        self.transparency.start();
        if self.channel.is_open() && !self.channel.subscribe_to_conversation(&local_id) {
            tracing::debug!(conversation_id = %local_id, "subscribe frame not sent");
        }

        // 4. Ask
        let request = QaRequest::new(question).with_conversation(local_id.clone());
        let result = match self.client.ask(request).await {
            Ok(response) => {
                let confirmed = response.conversation_id;
                let mut store = self.store.write().await;
                store.adopt_id(&local_id, &confirmed).await;
                store
                    .append_message(&confirmed, MessageRole::Assistant, response.answer.as_str())
                    .await;
                tracing::info!(
                    conversation_id = %confirmed,
                    message_id = %response.message_id,
                    "question answered"
                );
                AskQuestionResult::Answered {
                    conversation_id: confirmed,
                    message_id: response.message_id,
                    answer: response.answer,
                }
            }
            Err(err) => {
                tracing::warn!(
                    conversation_id = %local_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "question failed"
                );
                AskQuestionResult::Failed(err)
            }
        };

        // 5. Close the stage display and leave loading
        self.transparency.stop();
        let error = match &result {
            AskQuestionResult::Failed(err) => Some(user_message(err)),
            _ => None,
        };
        self.status.send_replace(ExchangeStatus {
            is_loading: false,
            error,
        });

        result
    }
}

fn user_message(err: &ApiError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        "Failed to get answer".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::qa::MockQaClient;
    use crate::adapters::storage::InMemorySnapshotStorage;
    use crate::application::conversation_store::ConversationStore;
    use crate::domain::realtime::{kinds, ConnectionPhase};
    use crate::domain::transparency::StageStatus;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct RecordingChannel {
        phase: ConnectionPhase,
        sent: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingChannel {
        fn new(phase: ConnectionPhase) -> Self {
            Self {
                phase,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(String, Value)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl RealtimeChannel for RecordingChannel {
        fn phase(&self) -> ConnectionPhase {
            self.phase
        }

        fn send(&self, kind: &str, data: Value) -> bool {
            if !self.phase.is_open() {
                return false;
            }
            self.sent.lock().unwrap().push((kind.to_string(), data));
            true
        }
    }

    struct Fixture {
        handler: AskQuestionHandler,
        store: SharedConversationStore,
        transparency: SharedTransparency,
        channel: Arc<RecordingChannel>,
    }

    fn fixture(client: MockQaClient, phase: ConnectionPhase) -> Fixture {
        let store = ConversationStore::new(Arc::new(InMemorySnapshotStorage::new())).shared();
        let transparency = SharedTransparency::new();
        let channel = Arc::new(RecordingChannel::new(phase));
        let handler = AskQuestionHandler::new(
            Arc::new(client),
            store.clone(),
            transparency.clone(),
            channel.clone(),
        );
        Fixture {
            handler,
            store,
            transparency,
            channel,
        }
    }

    #[tokio::test]
    async fn successful_exchange_appends_both_messages() {
        let f = fixture(
            MockQaClient::new().with_answer("Paris", "c1", "m1"),
            ConnectionPhase::Open,
        );

        let result = f
            .handler
            .handle(AskQuestionCommand::new("What is the capital of France?"))
            .await;

        assert_eq!(
            result,
            AskQuestionResult::Answered {
                conversation_id: ConversationId::new("c1").unwrap(),
                message_id: MessageId::new("m1").unwrap(),
                answer: "Paris".to_string(),
            }
        );
        let store = f.store.read().await;
        let conversation = store.current().unwrap();
        assert_eq!(conversation.id().as_str(), "c1");
        assert_eq!(conversation.messages()[0].role(), MessageRole::User);
        assert_eq!(conversation.messages()[0].content(), "What is the capital of France?");
        assert_eq!(conversation.messages()[1].role(), MessageRole::Assistant);
        assert_eq!(conversation.messages()[1].content(), "Paris");
        assert!(!f.transparency.snapshot().is_active());
        assert_eq!(f.handler.status(), ExchangeStatus::default());
    }

    #[tokio::test]
    async fn failed_exchange_sets_error_and_clears_loading() {
        let f = fixture(
            MockQaClient::new().with_status(500, r#"{"detail":"Internal server error"}"#),
            ConnectionPhase::Closed,
        );

        let result = f.handler.handle(AskQuestionCommand::new("Why?")).await;

        assert!(matches!(result, AskQuestionResult::Failed(ref e) if e.status() == 500));
        let status = f.handler.status();
        assert!(!status.is_loading);
        assert_eq!(status.error.as_deref(), Some("Internal server error"));
        assert!(!f.transparency.snapshot().is_active());
        let store = f.store.read().await;
        assert_eq!(store.current().unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn blank_question_is_ignored() {
        let client = MockQaClient::new();
        let f = fixture(client.clone(), ConnectionPhase::Open);

        assert_eq!(
            f.handler.handle(AskQuestionCommand::new("   ")).await,
            AskQuestionResult::Ignored
        );
        assert_eq!(client.call_count(), 0);
        assert!(f.store.read().await.conversations().is_empty());
    }

    #[tokio::test]
    async fn question_is_stored_and_sent_as_typed() {
        let client = MockQaClient::new().with_echo_answer("ok");
        let f = fixture(client.clone(), ConnectionPhase::Closed);
        let typed = "  indented\n    code block\n";

        f.handler.handle(AskQuestionCommand::new(typed)).await;

        assert_eq!(client.get_calls()[0].question, typed);
        let store = f.store.read().await;
        assert_eq!(store.current().unwrap().messages()[0].content(), typed);
    }

    #[tokio::test]
    async fn subscribes_only_when_channel_is_open() {
        let open = fixture(MockQaClient::new().with_echo_answer("a"), ConnectionPhase::Open);
        open.handler.handle(AskQuestionCommand::new("q")).await;
        let sent = open.channel.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, kinds::SUBSCRIBE);
        assert_eq!(sent[0].1["type"], "conversation");

        let closed = fixture(MockQaClient::new().with_echo_answer("a"), ConnectionPhase::Closed);
        closed.handler.handle(AskQuestionCommand::new("q")).await;
        assert!(closed.channel.sent().is_empty());
    }

    #[tokio::test]
    async fn sends_current_conversation_id_with_question() {
        let client = MockQaClient::new().with_echo_answer("one").with_echo_answer("two");
        let f = fixture(client.clone(), ConnectionPhase::Closed);

        f.handler.handle(AskQuestionCommand::new("first")).await;
        f.handler.handle(AskQuestionCommand::new("second")).await;

        let calls = client.get_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].conversation_id.is_some());
        assert_eq!(calls[0].conversation_id, calls[1].conversation_id);
        assert_eq!(f.store.read().await.current().unwrap().message_count(), 4);
    }

    #[tokio::test]
    async fn loading_and_active_while_call_is_in_flight() {
        let gate = Arc::new(Notify::new());
        let f = fixture(
            MockQaClient::new()
                .with_answer("Paris", "c1", "m1")
                .with_gate(gate.clone()),
            ConnectionPhase::Closed,
        );
        let handler = Arc::new(f.handler);

        let task = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle(AskQuestionCommand::new("q")).await })
        };

        let mut status = handler.watch_status();
        status.wait_for(|s| s.is_loading).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let state = f.transparency.snapshot();
        assert!(state.is_active());
        assert!(state.stages().iter().all(|s| s.status() == StageStatus::Pending));

        gate.notify_one();
        task.await.unwrap();
        assert!(!handler.status().is_loading);
    }

    #[tokio::test]
    async fn next_exchange_clears_previous_error() {
        let f = fixture(
            MockQaClient::new()
                .with_status(503, "")
                .with_echo_answer("ok"),
            ConnectionPhase::Closed,
        );

        f.handler.handle(AskQuestionCommand::new("a")).await;
        assert!(f.handler.status().error.is_some());

        f.handler.handle(AskQuestionCommand::new("b")).await;
        assert!(f.handler.status().error.is_none());
    }

    #[test]
    fn clear_error_only_touches_error() {
        let f = fixture(MockQaClient::new(), ConnectionPhase::Closed);
        f.handler.status.send_replace(ExchangeStatus {
            is_loading: true,
            error: Some("boom".into()),
        });

        f.handler.clear_error();

        assert_eq!(
            f.handler.status(),
            ExchangeStatus {
                is_loading: true,
                error: None
            }
        );
    }
}
