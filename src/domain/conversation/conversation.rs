//! Conversation entity - ordered, append-only message history.

use serde::{Deserialize, Serialize};

use super::{Message, MessageRole};
use crate::domain::foundation::{ConversationId, Timestamp};

/// Title given to conversations before their first question arrives.
pub const DEFAULT_TITLE: &str = "New Conversation";

/// Maximum number of characters taken from the first question for a title.
const TITLE_MAX_CHARS: usize = 50;

/// Conversation entity.
///
/// # Invariants
///
/// - `messages` are chronological and append-only
/// - `updated_at` is refreshed on every append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: ConversationId,
    messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Creates an empty conversation with the default title.
    pub fn new(id: ConversationId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            messages: Vec::new(),
            title: Some(DEFAULT_TITLE.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a conversation from persistence.
    pub fn reconstitute(
        id: ConversationId,
        messages: Vec<Message>,
        title: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            messages,
            title,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the conversation ID.
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Returns all messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns when the conversation was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the conversation last changed.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns the last message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a message and refreshes `updated_at`.
    ///
    /// The first user message replaces the default title.
    pub fn append(&mut self, message: Message) {
        if message.role() == MessageRole::User && self.has_default_title() {
            self.title = Some(title_from_question(message.content()));
        }
        self.messages.push(message);
        self.updated_at = Timestamp::now();
    }

    /// Replaces the id with one confirmed by the backend.
    pub(crate) fn rekey(&mut self, id: ConversationId) {
        self.id = id;
        self.updated_at = Timestamp::now();
    }

    /// Consumes the conversation, returning its messages.
    pub(crate) fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    fn has_default_title(&self) -> bool {
        match self.title.as_deref() {
            None => true,
            Some(title) => title == DEFAULT_TITLE,
        }
    }
}

fn title_from_question(question: &str) -> String {
    let trimmed = question.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}...", head.trim_end())
}
