//! Transparency module - live progress of the backend pipeline.
//!
//! A [`TransparencyState`] is armed at the start of every question-answer
//! exchange, mutated by pushed updates and disarmed when the exchange ends.
//! It is ephemeral and never persisted.

mod stage;
mod state;

pub use stage::{default_stages, NewStage, ProcessingStage, StagePatch, StageStatus};
pub use state::TransparencyState;
