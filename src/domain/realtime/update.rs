//! Decoding of transparency payloads carried inside frames.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::frame::{kinds, Frame, FrameError};
use crate::domain::foundation::StageId;
use crate::domain::transparency::StageStatus;

/// A decoded transparency update.
///
/// Optional fields mirror the wire: a `stage_update` missing its id or status
/// decodes fine and is ignored when applied.
#[derive(Debug, Clone, PartialEq)]
pub enum TransparencyUpdate {
    StageUpdate {
        stage_id: Option<StageId>,
        status: Option<StageStatus>,
        message: Option<String>,
    },
    ProgressUpdate {
        progress: Option<f64>,
    },
    StageComplete {
        stage_id: Option<StageId>,
        message: Option<String>,
    },
    /// The backend began work on a message. The local pipeline is already
    /// started by the exchange, so this carries no state.
    ProcessingStart,
    ProcessingComplete,
    /// Heartbeat reply.
    Pong,
    /// Any discriminator this client does not understand.
    Unknown(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagePayload {
    #[serde(default)]
    stage_id: Option<String>,
    #[serde(default)]
    status: Option<StageStatus>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ProgressPayload {
    #[serde(default)]
    progress: Option<f64>,
}

impl TransparencyUpdate {
    /// Routing key of a frame.
    ///
    /// Category frames (`transparency_update`) carry it in `data.type`; every
    /// other frame is routed by its own `type`.
    pub fn discriminator(frame: &Frame) -> &str {
        if frame.kind == kinds::TRANSPARENCY_UPDATE {
            if let Some(inner) = frame.data.get("type").and_then(Value::as_str) {
                return inner;
            }
        }
        &frame.kind
    }

    /// Decodes the payload of a frame.
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let kind = Self::discriminator(frame);
        let update = match kind {
            kinds::STAGE_UPDATE => {
                let payload: StagePayload = payload(kind, &frame.data)?;
                TransparencyUpdate::StageUpdate {
                    stage_id: stage_id(payload.stage_id),
                    status: payload.status,
                    message: payload.message,
                }
            }
            kinds::STAGE_COMPLETE => {
                let payload: StagePayload = payload(kind, &frame.data)?;
                TransparencyUpdate::StageComplete {
                    stage_id: stage_id(payload.stage_id),
                    message: payload.message,
                }
            }
            kinds::PROGRESS_UPDATE => {
                let payload: ProgressPayload = payload(kind, &frame.data)?;
                TransparencyUpdate::ProgressUpdate {
                    progress: payload.progress,
                }
            }
            kinds::PROCESSING_START => TransparencyUpdate::ProcessingStart,
            kinds::PROCESSING_COMPLETE => TransparencyUpdate::ProcessingComplete,
            kinds::PONG => TransparencyUpdate::Pong,
            other => TransparencyUpdate::Unknown(other.to_string()),
        };
        Ok(update)
    }
}

fn payload<T: DeserializeOwned>(kind: &str, data: &Value) -> Result<T, FrameError> {
    let data = if data.is_null() {
        Value::Object(Default::default())
    } else {
        data.clone()
    };
    serde_json::from_value(data).map_err(|e| FrameError::Payload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

fn stage_id(raw: Option<String>) -> Option<StageId> {
    raw.and_then(|id| StageId::new(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(kind: &str, data: Value) -> Frame {
        Frame {
            kind: kind.to_string(),
            data,
            timestamp: 0,
        }
    }

    #[test]
    fn decodes_stage_update() {
        let update = TransparencyUpdate::from_frame(&frame(
            "stage_update",
            json!({"stageId": "document_retrieval", "status": "in_progress", "message": "Searching"}),
        ))
        .unwrap();

        assert_eq!(
            update,
            TransparencyUpdate::StageUpdate {
                stage_id: Some(StageId::new("document_retrieval").unwrap()),
                status: Some(StageStatus::InProgress),
                message: Some("Searching".to_string()),
            }
        );
    }

    #[test]
    fn stage_update_without_fields_still_decodes() {
        let update = TransparencyUpdate::from_frame(&frame("stage_update", Value::Null)).unwrap();
        assert_eq!(
            update,
            TransparencyUpdate::StageUpdate {
                stage_id: None,
                status: None,
                message: None
            }
        );
    }

    #[test]
    fn decodes_progress_and_completion() {
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("progress_update", json!({"progress": 0.42})))
                .unwrap(),
            TransparencyUpdate::ProgressUpdate {
                progress: Some(0.42)
            }
        );
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("processing_complete", json!({}))).unwrap(),
            TransparencyUpdate::ProcessingComplete
        );
    }

    #[test]
    fn category_frame_routes_by_inner_type() {
        let f = frame(
            "transparency_update",
            json!({"type": "stage_complete", "stageId": "memory_saving", "conversationId": "c1"}),
        );

        assert_eq!(TransparencyUpdate::discriminator(&f), "stage_complete");
        assert_eq!(
            TransparencyUpdate::from_frame(&f).unwrap(),
            TransparencyUpdate::StageComplete {
                stage_id: Some(StageId::new("memory_saving").unwrap()),
                message: None,
            }
        );
    }

    #[test]
    fn control_frames_decode_to_their_own_variants() {
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("processing_start", json!({}))).unwrap(),
            TransparencyUpdate::ProcessingStart
        );
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("pong", Value::Null)).unwrap(),
            TransparencyUpdate::Pong
        );
    }

    #[test]
    fn unknown_types_decode_as_unknown() {
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("agent_thought", json!({}))).unwrap(),
            TransparencyUpdate::Unknown("agent_thought".to_string())
        );
        assert_eq!(
            TransparencyUpdate::from_frame(&frame("transparency_update", json!({}))).unwrap(),
            TransparencyUpdate::Unknown("transparency_update".to_string())
        );
    }

    #[test]
    fn wrongly_typed_payload_is_an_error() {
        let result =
            TransparencyUpdate::from_frame(&frame("progress_update", json!({"progress": "half"})));
        assert!(matches!(result, Err(FrameError::Payload { .. })));

        let result =
            TransparencyUpdate::from_frame(&frame("stage_update", json!({"status": "done"})));
        assert!(result.is_err());
    }
}
