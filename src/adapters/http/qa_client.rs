//! HTTP QA Client - Implementation of QaClient and ConversationCatalog over reqwest.
//!
//! # Configuration
//!
//! ```ignore
//! let client = HttpQaClient::new("http://localhost:8001", Duration::from_secs(120))?;
//! let answer = client.ask(QaRequest::new("What is the capital of France?")).await?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::{
    ApiError, ConversationCatalog, ConversationSummary, HealthStatus, QaClient, QaRequest,
    QaResponse, RemoteConversation,
};

/// reqwest-backed client for the question-answering backend.
#[derive(Debug, Clone)]
pub struct HttpQaClient {
    base_url: Url,
    timeout: Duration,
    client: Client,
}

impl HttpQaClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// `Client` if the URL is not an absolute http(s) URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Client(format!("invalid base URL '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Client(format!(
                "base URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Client(format!("cannot extend URL {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Sends a request, mapping transport failures to `Network`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timed out after {}s", self.timeout.as_secs())
            } else {
                e.to_string()
            };
            ApiError::Network(format!(
                "{}. Make sure the backend is running on {}",
                reason,
                self.base_url.as_str().trim_end_matches('/')
            ))
        })?;
        Self::handle_response_status(response).await
    }

    /// Converts non-2xx responses into `ApiError::Status`.
    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "backend returned error status");
        Err(ApiError::from_response(
            status.as_u16(),
            status.canonical_reason(),
            &body,
        ))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QaClient for HttpQaClient {
    async fn ask(&self, request: QaRequest) -> Result<QaResponse, ApiError> {
        let url = self.endpoint(&["api", "qa"])?;
        tracing::debug!(
            conversation_id = request.conversation_id.as_ref().map(|id| id.as_str()),
            "submitting question"
        );

        let response = self.send(self.client.post(url).json(&request)).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl ConversationCatalog for HttpQaClient {
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        let url = self.endpoint(&["api", "conversations"])?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<RemoteConversation, ApiError> {
        let url = self.endpoint(&["api", "conversations", id.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "conversations", id.as_str()])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn processing_status(&self, message_id: &MessageId) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "processing", message_id.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint(&["health"])?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpQaClient {
        HttpQaClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_invalid_base_urls() {
        assert!(matches!(
            HttpQaClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::Client(_))
        ));
        assert!(matches!(
            HttpQaClient::new("ftp://example.com", Duration::from_secs(1)),
            Err(ApiError::Client(_))
        ));
    }

    #[test]
    fn endpoints_join_onto_base() {
        let c = client("http://localhost:8001");
        assert_eq!(
            c.endpoint(&["api", "qa"]).unwrap().as_str(),
            "http://localhost:8001/api/qa"
        );

        let c = client("http://localhost:8001/prefix/");
        assert_eq!(
            c.endpoint(&["health"]).unwrap().as_str(),
            "http://localhost:8001/prefix/health"
        );
    }

    #[test]
    fn path_segments_are_encoded() {
        let c = client("http://localhost:8001");
        assert_eq!(
            c.endpoint(&["api", "conversations", "a b/c"]).unwrap().as_str(),
            "http://localhost:8001/api/conversations/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error_with_hint() {
        let c = client("http://127.0.0.1:9");
        let err = c.ask(QaRequest::new("hello")).await.unwrap_err();

        assert_eq!(err.status(), 0);
        assert!(matches!(err, ApiError::Network(_)));
        assert!(err.to_string().contains("http://127.0.0.1:9"));
    }
}
