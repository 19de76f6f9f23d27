//! QA Client Port - Interface to the question-answering backend.
//!
//! The main exchange is a single synchronous call (`POST /api/qa`). The
//! auxiliary read endpoints live on [`ConversationCatalog`] and share the
//! same [`ApiError`] handling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{ConversationId, MessageId};

/// Port for asking the backend a question.
#[async_trait]
pub trait QaClient: Send + Sync {
    /// Submits a question and waits for the full answer.
    ///
    /// # Errors
    ///
    /// - `Status` for non-2xx responses
    /// - `Network` when the backend cannot be reached
    /// - `Decode` when the body is not a valid answer
    async fn ask(&self, request: QaRequest) -> Result<QaResponse, ApiError>;
}

/// Port for the auxiliary conversation endpoints.
#[async_trait]
pub trait ConversationCatalog: Send + Sync {
    /// Lists server-side conversations, most recently updated first.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError>;

    /// Fetches one conversation with its messages.
    async fn get_conversation(&self, id: &ConversationId) -> Result<RemoteConversation, ApiError>;

    /// Deletes a conversation on the server.
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError>;

    /// Returns the processing status of a message as reported by the server.
    async fn processing_status(&self, message_id: &MessageId) -> Result<Value, ApiError>;

    /// Checks backend liveness.
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

// ════════════════════════════════════════════════════════════════════════════════
// Request/Response Types
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/qa`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

impl QaRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }
}

/// Answer returned by `POST /api/qa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaResponse {
    pub answer: String,
    /// Conversation id assigned or confirmed by the backend.
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    /// Final transparency snapshot, when the backend includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<Value>,
}

/// Row of `GET /api/conversations`. Dates are passed through as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub message_count: u32,
}

/// Body of `GET /api/conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConversation {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub messages: Vec<RemoteMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Types
// ════════════════════════════════════════════════════════════════════════════════

/// Errors from backend calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not what the endpoint promises.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// HTTP status, or 0 for failures that never produced a response.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Status { status, .. } => *status,
            _ => 0,
        }
    }

    /// Builds a status error with a best-effort message taken from `body`.
    ///
    /// Prefers a `detail`, `message` or `error` string field of a JSON body,
    /// then the raw body text, then `HTTP <code>: <reason>`.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = message_from_body(body).unwrap_or_else(|| {
            format!("HTTP {}: {}", status, reason.unwrap_or("Unknown Status"))
        });
        ApiError::Status { status, message }
    }

    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Network(_) => true,
            ApiError::Decode(_) | ApiError::Client(_) => false,
        }
    }
}

fn message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["detail", "message", "error"] {
            if let Some(Value::String(text)) = map.get(key) {
                if !text.trim().is_empty() {
                    return Some(text.clone());
                }
            }
        }
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_conversation_id() {
        let json = serde_json::to_value(QaRequest::new("Hi")).unwrap();
        assert_eq!(json, serde_json::json!({"question": "Hi"}));

        let json = serde_json::to_value(
            QaRequest::new("Hi").with_conversation(ConversationId::new("c1").unwrap()),
        )
        .unwrap();
        assert_eq!(json["conversationId"], "c1");
    }

    #[test]
    fn response_decodes_camel_case() {
        let response: QaResponse = serde_json::from_str(
            r#"{"answer":"Paris","conversationId":"c1","messageId":"m1"}"#,
        )
        .unwrap();
        assert_eq!(response.answer, "Paris");
        assert_eq!(response.conversation_id.as_str(), "c1");
        assert_eq!(response.message_id.as_str(), "m1");
        assert!(response.transparency.is_none());
    }

    #[test]
    fn response_with_empty_ids_does_not_decode() {
        assert!(serde_json::from_str::<QaResponse>(
            r#"{"answer":"Paris","conversationId":"","messageId":"m1"}"#,
        )
        .is_err());
        assert!(serde_json::from_str::<QaResponse>(
            r#"{"answer":"Paris","conversationId":"c1","messageId":""}"#,
        )
        .is_err());
    }

    #[test]
    fn retryable_errors() {
        assert!(ApiError::Network("refused".into()).is_retryable());
        assert!(ApiError::Status { status: 503, message: String::new() }.is_retryable());
        assert!(!ApiError::Status { status: 404, message: String::new() }.is_retryable());
        assert!(!ApiError::Decode("bad".into()).is_retryable());
    }

    #[test]
    fn error_message_prefers_json_detail() {
        let err = ApiError::from_response(500, Some("Internal Server Error"), r#"{"detail":"boom"}"#);
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn error_message_falls_back_to_body_then_status_line() {
        let err = ApiError::from_response(502, Some("Bad Gateway"), "upstream down");
        assert_eq!(err.to_string(), "upstream down");

        let err = ApiError::from_response(500, Some("Internal Server Error"), "  ");
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn non_http_errors_report_status_zero() {
        assert_eq!(ApiError::Network("refused".into()).status(), 0);
        assert_eq!(ApiError::Decode("bad".into()).status(), 0);
    }

    #[test]
    fn retryable_classification() {
        assert!(ApiError::Network("x".into()).is_retryable());
        assert!(ApiError::from_response(503, None, "").is_retryable());
        assert!(!ApiError::from_response(404, None, "").is_retryable());
    }
}
