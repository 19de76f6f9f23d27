//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the chat and transparency domain.

mod errors;
mod ids;
mod progress;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{ConversationId, MessageId, StageId};
pub use progress::Progress;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
