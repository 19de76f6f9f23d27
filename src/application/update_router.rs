//! Update Router - maps inbound frames onto transparency operations.
//!
//! | discriminator         | action                                        |
//! |-----------------------|-----------------------------------------------|
//! | `stage_update`        | set status (+ description) of a known stage   |
//! | `progress_update`     | set progress, clamped to `[0, 1]`             |
//! | `stage_complete`      | status `completed`, default description       |
//! | `processing_complete` | deactivate, keep stages                       |
//! | `processing_start`    | logged, no change                             |
//! | `pong`                | no change                                     |
//! | anything else         | logged, no change                             |

use async_trait::async_trait;

use super::transparency::SharedTransparency;
use crate::domain::foundation::{StageId, StateMachine};
use crate::domain::realtime::{Frame, TransparencyUpdate};
use crate::domain::transparency::{StagePatch, StageStatus};
use crate::ports::{TransportError, TransportHandler};

/// Description given to completed stages that arrive without a message.
pub const DEFAULT_COMPLETION_MESSAGE: &str = "Completed successfully";

/// How `progress_update` frames interact with the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressPolicy {
    /// Apply every update as received, even if it lowers progress.
    #[default]
    Verbatim,
    /// Ignore updates lower than the current value while active.
    Monotonic,
}

/// What the router did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The transparency state changed.
    Applied,
    /// A recognised update that did not apply (missing fields, unknown stage).
    Ignored,
    /// A discriminator this client does not handle.
    Unknown(String),
    /// The payload could not be decoded.
    Malformed,
}

/// Routes frames into a [`SharedTransparency`].
#[derive(Debug, Clone)]
pub struct UpdateRouter {
    transparency: SharedTransparency,
    policy: ProgressPolicy,
}

impl UpdateRouter {
    pub fn new(transparency: SharedTransparency) -> Self {
        Self {
            transparency,
            policy: ProgressPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ProgressPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Applies one frame.
    pub fn route(&self, frame: &Frame) -> RouteOutcome {
        let update = match TransparencyUpdate::from_frame(frame) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!(frame_type = %frame.kind, error = %e, "dropping undecodable update");
                return RouteOutcome::Malformed;
            }
        };

        match update {
            TransparencyUpdate::StageUpdate {
                stage_id: Some(stage_id),
                status: Some(status),
                message,
            } => self.apply_stage(&stage_id, status, message),
            TransparencyUpdate::StageUpdate { .. } => {
                tracing::debug!("stage_update without stage id or status ignored");
                RouteOutcome::Ignored
            }
            TransparencyUpdate::ProgressUpdate {
                progress: Some(progress),
            } => self.apply_progress(progress),
            TransparencyUpdate::ProgressUpdate { progress: None } => {
                tracing::debug!("progress_update without progress ignored");
                RouteOutcome::Ignored
            }
            TransparencyUpdate::StageComplete {
                stage_id: Some(stage_id),
                message,
            } => self.apply_stage(
                &stage_id,
                StageStatus::Completed,
                Some(message.unwrap_or_else(|| DEFAULT_COMPLETION_MESSAGE.to_string())),
            ),
            TransparencyUpdate::StageComplete { stage_id: None, .. } => {
                tracing::debug!("stage_complete without stage id ignored");
                RouteOutcome::Ignored
            }
            TransparencyUpdate::ProcessingComplete => {
                tracing::debug!("processing complete");
                self.transparency.stop();
                RouteOutcome::Applied
            }
            TransparencyUpdate::ProcessingStart => {
                tracing::debug!("backend started processing");
                RouteOutcome::Ignored
            }
            TransparencyUpdate::Pong => {
                tracing::trace!("pong");
                RouteOutcome::Ignored
            }
            TransparencyUpdate::Unknown(kind) => {
                tracing::debug!(frame_type = %kind, "unknown update type");
                RouteOutcome::Unknown(kind)
            }
        }
    }

    fn apply_stage(
        &self,
        stage_id: &StageId,
        status: StageStatus,
        description: Option<String>,
    ) -> RouteOutcome {
        let previous = self
            .transparency
            .read(|state| state.stage(stage_id).map(|stage| stage.status()));
        if let Some(previous) = previous {
            if previous != status && !previous.can_transition_to(&status) {
                tracing::debug!(
                    stage_id = %stage_id,
                    from = %previous,
                    to = %status,
                    "stage status outside normal lifecycle, applying as received"
                );
            }
        }

        let patch = StagePatch {
            status: Some(status),
            description,
        };
        if self.transparency.update_stage(stage_id, patch) {
            tracing::debug!(stage_id = %stage_id, status = %status, "stage updated");
            RouteOutcome::Applied
        } else {
            tracing::debug!(stage_id = %stage_id, "update for unknown stage ignored");
            RouteOutcome::Ignored
        }
    }

    fn apply_progress(&self, progress: f64) -> RouteOutcome {
        if progress.is_nan() {
            tracing::debug!("non-numeric progress ignored");
            return RouteOutcome::Ignored;
        }
        if self.policy == ProgressPolicy::Monotonic {
            let regresses = self
                .transparency
                .read(|state| state.is_active() && progress < state.progress().value());
            if regresses {
                tracing::debug!(progress, "progress regression ignored");
                return RouteOutcome::Ignored;
            }
        }
        self.transparency.set_progress(progress);
        tracing::debug!(progress, "progress updated");
        RouteOutcome::Applied
    }
}

#[async_trait]
impl TransportHandler for UpdateRouter {
    async fn on_open(&self) {
        tracing::debug!("transparency updates connected");
    }

    async fn on_close(&self) {
        tracing::debug!("transparency updates disconnected");
    }

    async fn on_error(&self, error: &TransportError) {
        tracing::debug!(error = %error, "transparency updates error");
    }

    async fn on_message(&self, frame: Frame) {
        self.route(&frame);
    }
}
