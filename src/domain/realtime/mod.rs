//! Real-time protocol vocabulary.
//!
//! - [`Frame`] - the `{type, data, timestamp}` envelope
//! - [`TransparencyUpdate`] - decoded pipeline updates
//! - [`Subscription`] - outbound subscribe/unsubscribe payloads
//! - [`ConnectionPhase`] - lifecycle of the connection

mod frame;
mod phase;
mod subscription;
mod update;

pub use frame::{kinds, Frame, FrameError};
pub use phase::ConnectionPhase;
pub use subscription::Subscription;
pub use update::TransparencyUpdate;
