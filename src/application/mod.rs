//! Application layer - shared state, routing and the exchange orchestrator.
//!
//! This layer coordinates domain operations between ports. Pushed frames flow
//! through [`UpdateRouter`] into [`SharedTransparency`]; user questions flow
//! through [`AskQuestionHandler`] into the [`ConversationStore`].

pub mod conversation_store;
pub mod handlers;
pub mod session;
pub mod transparency;
pub mod update_router;

pub use conversation_store::{ConversationStore, SharedConversationStore};
pub use handlers::{AskQuestionCommand, AskQuestionHandler, AskQuestionResult, ExchangeStatus};
pub use session::{ChatSession, SessionError, SessionPorts};
pub use transparency::SharedTransparency;
pub use update_router::{ProgressPolicy, RouteOutcome, UpdateRouter, DEFAULT_COMPLETION_MESSAGE};
