//! Mock QA Client for testing.
//!
//! Provides a configurable mock implementation of the QaClient port,
//! allowing tests to run without a backend.
//!
//! # Example
//!
//! ```ignore
//! let client = MockQaClient::new()
//!     .with_answer("Paris", "c1", "m1")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = client.ask(QaRequest::new("Capital of France?")).await?;
//! assert_eq!(response.answer, "Paris");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;

use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::{ApiError, QaClient, QaRequest, QaResponse};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    /// Answer successfully.
    Success {
        answer: String,
        conversation_id: Option<ConversationId>,
        message_id: MessageId,
    },
    /// Fail with the given error.
    Error(ApiError),
}

/// Mock QA client for testing.
///
/// Answers are consumed in order. When the queue is empty the client answers
/// with a canned response in the requested conversation.
#[derive(Debug, Clone)]
pub struct MockQaClient {
    answers: Arc<Mutex<VecDeque<MockAnswer>>>,
    delay: Duration,
    gate: Option<Arc<Notify>>,
    calls: Arc<Mutex<Vec<QaRequest>>>,
}

impl Default for MockQaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockQaClient {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            gate: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful answer in the given conversation.
    pub fn with_answer(self, answer: impl Into<String>, conversation_id: &str, message_id: &str) -> Self {
        self.push(MockAnswer::Success {
            answer: answer.into(),
            conversation_id: ConversationId::new(conversation_id).ok(),
            message_id: MessageId::new(message_id).unwrap_or_else(|_| MessageId::generate()),
        })
    }

    /// Queues a successful answer that echoes the requested conversation id.
    pub fn with_echo_answer(self, answer: impl Into<String>) -> Self {
        self.push(MockAnswer::Success {
            answer: answer.into(),
            conversation_id: None,
            message_id: MessageId::generate(),
        })
    }

    /// Queues an error.
    pub fn with_error(self, error: ApiError) -> Self {
        self.push(MockAnswer::Error(error))
    }

    /// Queues a non-2xx response.
    pub fn with_status(self, status: u16, body: &str) -> Self {
        self.with_error(ApiError::from_response(status, None, body))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Holds every call until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<QaRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, answer: MockAnswer) -> Self {
        self.answers.lock().unwrap().push_back(answer);
        self
    }

    fn next_answer(&self) -> MockAnswer {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockAnswer::Success {
                answer: "Mock answer".to_string(),
                conversation_id: None,
                message_id: MessageId::generate(),
            })
    }
}

#[async_trait]
impl QaClient for MockQaClient {
    async fn ask(&self, request: QaRequest) -> Result<QaResponse, ApiError> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_answer() {
            MockAnswer::Success {
                answer,
                conversation_id,
                message_id,
            } => Ok(QaResponse {
                answer,
                conversation_id: conversation_id
                    .or(request.conversation_id)
                    .unwrap_or_else(ConversationId::generate),
                message_id,
                transparency: None,
            }),
            MockAnswer::Error(err) => Err(err),
        }
    }
}
