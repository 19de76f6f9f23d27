//! TransparencyState - the in-memory pipeline progress model.

use serde::{Deserialize, Serialize};

use super::stage::{default_stages, NewStage, ProcessingStage, StagePatch, StageStatus};
use crate::domain::foundation::{Progress, StageId, Timestamp, ValidationError};

/// Ordered pipeline stages, overall progress and the active stage pointer.
///
/// # Invariants
///
/// - `progress` is always within `[0, 1]`
/// - `current_stage`, when set, names a stage present in `stages`
/// - stage ids are unique
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyState {
    is_active: bool,
    stages: Vec<ProcessingStage>,
    current_stage: Option<StageId>,
    progress: Progress,
}

impl TransparencyState {
    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Stages in pipeline order.
    pub fn stages(&self) -> &[ProcessingStage] {
        &self.stages
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Looks up a stage by id.
    pub fn stage(&self, id: &StageId) -> Option<&ProcessingStage> {
        self.stages.iter().find(|stage| stage.id() == id)
    }

    /// The stage that most recently reported `in_progress`.
    pub fn current_stage(&self) -> Option<&ProcessingStage> {
        self.current_stage.as_ref().and_then(|id| self.stage(id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Arms the model with a fresh five-stage template.
    pub fn start(&mut self) {
        self.is_active = true;
        self.stages = default_stages();
        self.current_stage = None;
        self.progress = Progress::ZERO;
    }

    /// Disarms the model, leaving stages and progress for a final render.
    pub fn stop(&mut self) {
        self.is_active = false;
    }

    /// Merges `patch` into the named stage.
    ///
    /// Returns false when no stage has that id. A merged status of
    /// `in_progress` moves the current-stage pointer to this stage.
    pub fn update_stage(&mut self, id: &StageId, patch: StagePatch, at: Timestamp) -> bool {
        let Some(stage) = self.stages.iter_mut().find(|stage| stage.id() == id) else {
            return false;
        };
        stage.apply(patch, at);
        if stage.status() == StageStatus::InProgress {
            self.current_stage = Some(id.clone());
        }
        true
    }

    /// Stores `value` clamped to `[0, 1]`.
    pub fn set_progress(&mut self, value: f64) {
        self.progress = Progress::new(value);
    }

    /// Appends a stage at the end of the pipeline, stamped with `at`.
    pub fn append_stage(&mut self, stage: NewStage, at: Timestamp) -> Result<(), ValidationError> {
        if self.stage(&stage.id).is_some() {
            return Err(ValidationError::invalid_format(
                "stage_id",
                format!("stage '{}' already exists", stage.id),
            ));
        }
        let in_progress = stage.status == StageStatus::InProgress;
        let id = stage.id.clone();
        self.stages.push(stage.into_stage(at));
        if in_progress {
            self.current_stage = Some(id);
        }
        Ok(())
    }

    /// Returns to the empty, inactive state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> StageId {
        StageId::new(s).unwrap()
    }

    fn started() -> TransparencyState {
        let mut state = TransparencyState::default();
        state.start();
        state
    }

    #[test]
    fn default_is_inactive_and_empty() {
        let state = TransparencyState::default();
        assert!(!state.is_active());
        assert!(state.stages().is_empty());
        assert!(state.current_stage().is_none());
        assert_eq!(state.progress(), Progress::ZERO);
    }

    #[test]
    fn start_yields_five_pending_stages() {
        let mut state = TransparencyState::default();
        state.set_progress(0.8);
        state.start();

        assert!(state.is_active());
        assert_eq!(state.stages().len(), 5);
        assert!(state.stages().iter().all(|s| s.status() == StageStatus::Pending));
        assert_eq!(state.progress().value(), 0.0);
        assert!(state.current_stage().is_none());
    }

    #[test]
    fn start_discards_previous_exchange() {
        let mut state = started();
        state.update_stage(
            &id("document_retrieval"),
            StagePatch::status(StageStatus::InProgress),
            Timestamp::now(),
        );
        state.start();

        assert!(state.current_stage().is_none());
        assert!(state.stages().iter().all(|s| s.status() == StageStatus::Pending));
    }

    #[test]
    fn stop_only_flips_active() {
        let mut state = started();
        state.update_stage(
            &id("question_processing"),
            StagePatch::status(StageStatus::Completed),
            Timestamp::now(),
        );
        state.set_progress(0.4);
        let before = state.clone();

        state.stop();

        assert!(!state.is_active());
        assert_eq!(state.stages(), before.stages());
        assert_eq!(state.progress(), before.progress());
    }

    #[test]
    fn in_progress_repoints_current_stage() {
        let mut state = started();
        let now = Timestamp::now();
        state.update_stage(&id("question_processing"), StagePatch::status(StageStatus::InProgress), now);
        state.update_stage(&id("document_retrieval"), StagePatch::status(StageStatus::InProgress), now);
        state.update_stage(&id("question_processing"), StagePatch::status(StageStatus::Completed), now);

        assert_eq!(state.current_stage().unwrap().id().as_str(), "document_retrieval");
    }

    #[test]
    fn update_unknown_stage_is_ignored() {
        let mut state = started();
        let before = state.clone();

        let applied = state.update_stage(
            &id("reranking"),
            StagePatch::status(StageStatus::Completed),
            Timestamp::now(),
        );

        assert!(!applied);
        assert_eq!(state, before);
    }

    #[test]
    fn update_stamps_receipt_time_and_description() {
        let mut state = started();
        let at = Timestamp::from_unix_millis(1_700_000_000_000);
        state.update_stage(
            &id("memory_saving"),
            StagePatch::status(StageStatus::Error).with_description("disk full"),
            at,
        );

        let stage = state.stage(&id("memory_saving")).unwrap();
        assert_eq!(stage.status(), StageStatus::Error);
        assert_eq!(stage.description(), "disk full");
        assert_eq!(stage.timestamp(), Some(&at));
    }

    #[test]
    fn terminal_stage_is_overwritten_verbatim() {
        let mut state = started();
        let now = Timestamp::now();
        state.update_stage(&id("context_generation"), StagePatch::status(StageStatus::Completed), now);
        state.update_stage(&id("context_generation"), StagePatch::status(StageStatus::InProgress), now);

        assert_eq!(
            state.stage(&id("context_generation")).unwrap().status(),
            StageStatus::InProgress
        );
    }

    #[test]
    fn append_stage_adds_at_end_with_timestamp() {
        let mut state = started();
        let at = Timestamp::now();
        state
            .append_stage(
                NewStage {
                    id: id("reranking"),
                    name: "Reranking".to_string(),
                    description: "Ordering passages".to_string(),
                    status: StageStatus::InProgress,
                    icon: None,
                },
                at,
            )
            .unwrap();

        let last = state.stages().last().unwrap();
        assert_eq!(last.id().as_str(), "reranking");
        assert_eq!(last.timestamp(), Some(&at));
        assert_eq!(state.current_stage().unwrap().id().as_str(), "reranking");
    }

    #[test]
    fn append_stage_rejects_duplicate_id() {
        let mut state = started();
        let result = state.append_stage(
            NewStage {
                id: id("memory_saving"),
                name: "Again".to_string(),
                description: String::new(),
                status: StageStatus::Pending,
                icon: None,
            },
            Timestamp::now(),
        );

        assert!(result.is_err());
        assert_eq!(state.stages().len(), 5);
    }

    #[test]
    fn reset_returns_to_default() {
        let mut state = started();
        state.set_progress(0.5);
        state.reset();
        assert_eq!(state, TransparencyState::default());
    }

    fn status_strategy() -> impl Strategy<Value = StageStatus> {
        prop_oneof![
            Just(StageStatus::Pending),
            Just(StageStatus::InProgress),
            Just(StageStatus::Completed),
            Just(StageStatus::Error),
        ]
    }

    proptest! {
        #[test]
        fn last_applied_status_wins_and_others_are_untouched(
            updates in prop::collection::vec((0usize..5, status_strategy()), 1..40)
        ) {
            let mut state = started();
            let ids: Vec<StageId> = state.stages().iter().map(|s| s.id().clone()).collect();
            let mut expected = vec![StageStatus::Pending; 5];

            for (index, status) in &updates {
                state.update_stage(&ids[*index], StagePatch::status(*status), Timestamp::now());
                expected[*index] = *status;
            }

            let actual: Vec<StageStatus> = state.stages().iter().map(|s| s.status()).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn set_progress_is_clamped_and_idempotent(value in -10.0f64..10.0) {
            let mut state = started();
            state.set_progress(value);
            let once = state.progress();
            state.set_progress(value);

            prop_assert_eq!(once, state.progress());
            prop_assert!((0.0..=1.0).contains(&once.value()));
        }
    }
}
