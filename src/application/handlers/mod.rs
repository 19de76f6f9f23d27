//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

mod ask_question;

pub use ask_question::{
    AskQuestionCommand, AskQuestionHandler, AskQuestionResult, ExchangeStatus,
};
