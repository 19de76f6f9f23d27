//! Domain layer containing the chat and transparency model.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `transparency` - Pipeline stages and the transparency state machine
//! - `conversation` - Conversations and messages
//! - `realtime` - Frame envelope, update decoding, connection phase

pub mod conversation;
pub mod foundation;
pub mod realtime;
pub mod transparency;
