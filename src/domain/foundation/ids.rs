//! Strongly-typed identifier value objects.
//!
//! Conversation ids may be assigned by the backend, so every identifier is a
//! non-empty string rather than a UUID. Locally generated ids carry a prefix
//! (`conv_`, `msg_`) followed by a random UUID in simple form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identifier of a conversation, either generated locally or confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Creates a ConversationId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("conversation_id"));
        }
        Ok(Self(id))
    }

    /// Generates a fresh client-side id.
    pub fn generate() -> Self {
        Self(format!("conv_{}", Uuid::new_v4().simple()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

impl FromStr for ConversationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageId(String);

impl MessageId {
    /// Creates a MessageId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("message_id"));
        }
        Ok(Self(id))
    }

    /// Generates a fresh client-side id.
    pub fn generate() -> Self {
        Self(format!("msg_{}", Uuid::new_v4().simple()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for MessageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Stable identifier of a pipeline stage (e.g. `document_retrieval`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageId(String);

impl StageId {
    /// Creates a StageId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("stage_id"));
        }
        Ok(Self(id))
    }

    /// Builds an id from a compile-time constant known to be non-empty.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StageId> for String {
    fn from(id: StageId) -> Self {
        id.0
    }
}

impl FromStr for StageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_rejects_empty() {
        assert!(ConversationId::new("").is_err());
        assert!(ConversationId::new("   ").is_err());
    }

    #[test]
    fn conversation_id_accepts_backend_assigned_value() {
        let id = ConversationId::new("c1").unwrap();
        assert_eq!(id.as_str(), "c1");
        assert_eq!(id.to_string(), "c1");
    }

    #[test]
    fn generated_ids_are_prefixed_and_unique() {
        let a = ConversationId::generate();
        let b = ConversationId::generate();
        assert!(a.as_str().starts_with("conv_"));
        assert_ne!(a, b);

        let m = MessageId::generate();
        assert!(m.as_str().starts_with("msg_"));
        assert_ne!(m, MessageId::generate());
    }

    #[test]
    fn stage_id_parses_from_str() {
        let id: StageId = "memory_saving".parse().unwrap();
        assert_eq!(id.as_str(), "memory_saving");
        assert!("".parse::<StageId>().is_err());
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = MessageId::new("m1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m1\"");

        let parsed: ConversationId = serde_json::from_str("\"c1\"").unwrap();
        assert_eq!(parsed.as_str(), "c1");
    }

    #[test]
    fn deserializing_empty_ids_fails() {
        assert!(serde_json::from_str::<ConversationId>("\"\"").is_err());
        assert!(serde_json::from_str::<MessageId>("\"  \"").is_err());
        assert!(serde_json::from_str::<StageId>("\"\"").is_err());
    }
}
