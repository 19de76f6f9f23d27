use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the single real-time connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    /// Never connected.
    #[default]
    Idle,
    Connecting,
    Open,
    /// Closed, possibly with a retry pending.
    Closed,
    /// Unrecoverable (e.g. an invalid URL); only a manual connect leaves it.
    Failed,
}

impl ConnectionPhase {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionPhase::Open)
    }

    /// Open or Connecting, where `connect()` is a no-op.
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionPhase::Open | ConnectionPhase::Connecting)
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionPhase::Idle => "idle",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Open => "open",
            ConnectionPhase::Closed => "closed",
            ConnectionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}
