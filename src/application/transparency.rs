//! Process-wide transparency state.
//!
//! [`SharedTransparency`] owns the single [`TransparencyState`] of a running
//! session inside a `watch` channel: mutations go through named operations,
//! reads never block writers, and renderers can subscribe to changes.

use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::foundation::{StageId, Timestamp, ValidationError};
use crate::domain::transparency::{NewStage, StagePatch, TransparencyState};

static GLOBAL: Lazy<SharedTransparency> = Lazy::new(SharedTransparency::new);

/// Cloneable handle to one transparency state.
#[derive(Debug, Clone)]
pub struct SharedTransparency {
    state: Arc<watch::Sender<TransparencyState>>,
}

impl Default for SharedTransparency {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedTransparency {
    /// Creates an independent, inactive state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(TransparencyState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// The process-wide instance, created on first use.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Clones the current state.
    pub fn snapshot(&self) -> TransparencyState {
        self.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&TransparencyState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// A receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<TransparencyState> {
        self.state.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn start(&self) {
        self.state.send_modify(TransparencyState::start);
    }

    pub fn stop(&self) {
        self.state.send_modify(TransparencyState::stop);
    }

    /// Merges `patch` into a stage, stamped with the current time.
    ///
    /// Returns false (and notifies nobody) when the id is unknown.
    pub fn update_stage(&self, id: &StageId, patch: StagePatch) -> bool {
        let at = Timestamp::now();
        self.state
            .send_if_modified(|state| state.update_stage(id, patch, at))
    }

    pub fn set_progress(&self, value: f64) {
        self.state.send_modify(|state| state.set_progress(value));
    }

    /// Appends a stage, stamped with the current time.
    pub fn append_stage(&self, stage: NewStage) -> Result<(), ValidationError> {
        let at = Timestamp::now();
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            result = state.append_stage(stage, at);
            result.is_ok()
        });
        result
    }

    /// Returns to the empty, inactive state.
    pub fn reset(&self) {
        self.state.send_replace(TransparencyState::default());
    }
}
