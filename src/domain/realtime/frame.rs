//! Frame envelope exchanged over the real-time channel.
//!
//! Every message in both directions is `{type, data, timestamp}`. Decoding is
//! lenient: `data` defaults to null and `timestamp` to 0, and the timestamp
//! accepts integer milliseconds, fractional seconds or an RFC 3339 string.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::foundation::Timestamp;

/// Known frame type names.
pub mod kinds {
    // Outbound
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    pub const PING: &str = "ping";

    // Inbound
    pub const STAGE_UPDATE: &str = "stage_update";
    pub const PROGRESS_UPDATE: &str = "progress_update";
    pub const STAGE_COMPLETE: &str = "stage_complete";
    pub const PROCESSING_COMPLETE: &str = "processing_complete";
    /// Category frame whose `data.type` carries one of the update kinds.
    pub const TRANSPARENCY_UPDATE: &str = "transparency_update";
    pub const PROCESSING_START: &str = "processing_start";
    pub const PONG: &str = "pong";
}

/// Errors raised while decoding inbound frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("malformed '{kind}' payload: {reason}")]
    Payload { kind: String, reason: String },
}

/// The wire envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    /// Unix milliseconds.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timestamp: i64,
}

impl Frame {
    /// Creates an outbound frame stamped with the current time.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
            timestamp: Timestamp::now().as_unix_millis(),
        }
    }

    /// Parses a text frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))
    }

    /// Serializes to the wire representation.
    pub fn to_json(&self) -> Result<String, FrameError> {
        serde_json::to_string(self).map_err(|e| FrameError::Malformed(e.to_string()))
    }

    /// Timestamp as a date value.
    pub fn sent_at(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.timestamp)
    }
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(millis) = n.as_i64() {
                Ok(millis)
            } else if let Some(seconds) = n.as_f64() {
                Ok((seconds * 1000.0).round() as i64)
            } else {
                Err(D::Error::custom("timestamp out of range"))
            }
        }
        Value::String(s) => Timestamp::parse_rfc3339(&s)
            .map(|ts| ts.as_unix_millis())
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", s))),
        other => Err(D::Error::custom(format!("invalid timestamp {}", other))),
    }
}
