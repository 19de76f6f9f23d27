//! Transparency Chat - question-answer client with live pipeline transparency.
//!
//! Questions go to the backend over HTTP while the backend pushes the
//! progress of its processing pipeline over a self-healing WebSocket. The
//! crate keeps a durable conversation history and a live, observable view of
//! the pipeline's stages.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
