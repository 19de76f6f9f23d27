//! Conversation Store - the durable record of conversations.
//!
//! Every mutation is followed by a snapshot save. Save failures are logged
//! and never surface to callers; the in-memory store stays authoritative.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message, MessageRole};
use crate::domain::foundation::{ConversationId, MessageId};
use crate::ports::{ConversationSnapshot, SnapshotStorage, StorageError};

/// The store as shared between the orchestrator and front-ends.
pub type SharedConversationStore = Arc<RwLock<ConversationStore>>;

/// Conversations, newest first, plus the current-conversation pointer.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    current: Option<ConversationId>,
    storage: Arc<dyn SnapshotStorage>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("conversations", &self.conversations.len())
            .field("current", &self.current)
            .finish()
    }
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self {
            conversations: Vec::new(),
            current: None,
            storage,
        }
    }

    /// Rehydrates the store from its last snapshot.
    ///
    /// A missing snapshot yields an empty store.
    pub async fn load(storage: Arc<dyn SnapshotStorage>) -> Result<Self, StorageError> {
        let snapshot = storage.load().await?.unwrap_or_default();
        let mut conversations = snapshot.conversations;

        let current = snapshot.current_conversation.map(|current| {
            let id = current.id().clone();
            if !conversations.iter().any(|c| c.id() == &id) {
                conversations.insert(0, current);
            }
            id
        });

        tracing::debug!(conversations = conversations.len(), "conversation store loaded");
        Ok(Self {
            conversations,
            current,
            storage,
        })
    }

    /// Wraps the store for sharing.
    pub fn shared(self) -> SharedConversationStore {
        Arc::new(RwLock::new(self))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// All conversations, newest first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    pub fn current_id(&self) -> Option<&ConversationId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current.as_ref().and_then(|id| self.get(id))
    }

    /// The persisted form of the store.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            conversations: self.conversations.clone(),
            current_conversation: self.current().cloned(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates an empty conversation at the front and makes it current.
    pub async fn create_conversation(&mut self) -> ConversationId {
        let id = self.insert_new(ConversationId::generate());
        self.persist().await;
        id
    }

    /// Returns the current conversation, creating one if there is none.
    pub async fn ensure_current(&mut self) -> ConversationId {
        match self.current() {
            Some(conversation) => conversation.id().clone(),
            None => self.create_conversation().await,
        }
    }

    /// Makes `id` current. Returns false if no such conversation exists.
    pub async fn set_current(&mut self, id: &ConversationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.current = Some(id.clone());
        self.persist().await;
        true
    }

    /// Leaves the store without a current conversation.
    pub async fn clear_current(&mut self) {
        self.current = None;
        self.persist().await;
    }

    /// Appends a new message to a conversation.
    ///
    /// Returns the message id, or `None` if the conversation does not exist.
    pub async fn append_message(
        &mut self,
        id: &ConversationId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Option<MessageId> {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id() == id) else {
            tracing::debug!(conversation_id = %id, "append to unknown conversation ignored");
            return None;
        };
        let message = Message::new(role, content);
        let message_id = message.id().clone();
        conversation.append(message);
        self.persist().await;
        Some(message_id)
    }

    /// Reconciles a locally created conversation with the id the backend
    /// confirmed for it.
    ///
    /// - same id: nothing to do
    /// - only `local` exists: it is re-keyed to `confirmed`
    /// - both exist: `local`'s messages move to the end of `confirmed`
    /// - neither exists: an empty `confirmed` conversation is created
    ///
    /// The current pointer follows the conversation.
    pub async fn adopt_id(&mut self, local: &ConversationId, confirmed: &ConversationId) {
        if local == confirmed && self.get(confirmed).is_some() {
            return;
        }

        let local_index = self.conversations.iter().position(|c| c.id() == local);
        let confirmed_exists = self.get(confirmed).is_some();

        match (local_index, confirmed_exists) {
            (Some(index), false) => {
                self.conversations[index].rekey(confirmed.clone());
            }
            (Some(index), true) => {
                let moved = self.conversations.remove(index).into_messages();
                if let Some(target) = self.conversations.iter_mut().find(|c| c.id() == confirmed) {
                    for message in moved {
                        target.append(message);
                    }
                }
            }
            (None, true) => {}
            (None, false) => {
                self.conversations
                    .insert(0, Conversation::new(confirmed.clone()));
            }
        }

        if self.current.is_none() || self.current.as_ref() == Some(local) {
            self.current = Some(confirmed.clone());
        }
        tracing::debug!(local = %local, confirmed = %confirmed, "conversation id adopted");
        self.persist().await;
    }

    /// Deletes a conversation. Clears the current pointer if it pointed there.
    pub async fn delete_conversation(&mut self, id: &ConversationId) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id() != id);
        if self.conversations.len() == before {
            return false;
        }
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        self.persist().await;
        true
    }

    /// Forgets every conversation and removes the stored snapshot.
    pub async fn clear_all(&mut self) {
        self.conversations.clear();
        self.current = None;
        if let Err(e) = self.storage.clear().await {
            tracing::warn!(error = %e, "failed to clear stored conversations");
        }
    }

    fn insert_new(&mut self, id: ConversationId) -> ConversationId {
        self.conversations.insert(0, Conversation::new(id.clone()));
        self.current = Some(id.clone());
        tracing::debug!(conversation_id = %id, "conversation created");
        id
    }

    async fn persist(&self) {
        if let Err(e) = self.storage.save(&self.snapshot()).await {
            tracing::warn!(error = %e, "failed to persist conversations");
        }
    }
}
