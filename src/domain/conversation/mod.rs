//! Conversation module - locally persisted chat history.
//!
//! A [`Conversation`] owns an ordered, append-only list of [`Message`]s.
//! Conversations are held exclusively by the conversation store; the
//! transparency model never references them.

mod conversation;
mod message;

pub use conversation::{Conversation, DEFAULT_TITLE};
pub use message::{Message, MessageRole};
