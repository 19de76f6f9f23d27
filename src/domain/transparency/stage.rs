//! Pipeline stages and their status lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StageId, StateMachine, Timestamp, ValidationError};

/// Status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Error,
}

impl StageStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
        }
    }
}

impl StateMachine for StageStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use StageStatus::*;
        match self {
            Pending => vec![InProgress],
            InProgress => vec![Completed, Error],
            Completed | Error => vec![],
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StageStatus::Pending),
            "in_progress" => Ok(StageStatus::InProgress),
            "completed" => Ok(StageStatus::Completed),
            "error" => Ok(StageStatus::Error),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown stage status '{}'", other),
            )),
        }
    }
}

/// One named step of the backend pipeline, tracked for display.
///
/// Identity (`id`, `name`, `icon`) is fixed at construction; only the status,
/// description and timestamp change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStage {
    id: StageId,
    name: String,
    description: String,
    status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
}

impl ProcessingStage {
    /// Creates a pending stage.
    pub fn new(
        id: StageId,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            status: StageStatus::Pending,
            icon,
            timestamp: None,
        }
    }

    pub fn id(&self) -> &StageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// When the stage last changed, if it ever did.
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    /// Merges a patch and stamps the receipt time.
    pub(crate) fn apply(&mut self, patch: StagePatch, at: Timestamp) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.timestamp = Some(at);
    }
}

/// Partial update for a stage. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePatch {
    pub status: Option<StageStatus>,
    pub description: Option<String>,
}

impl StagePatch {
    pub fn status(status: StageStatus) -> Self {
        Self {
            status: Some(status),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A stage appended after `start()` for pipelines of variable length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStage {
    pub id: StageId,
    pub name: String,
    pub description: String,
    pub status: StageStatus,
    pub icon: Option<String>,
}

impl NewStage {
    pub(crate) fn into_stage(self, at: Timestamp) -> ProcessingStage {
        ProcessingStage {
            id: self.id,
            name: self.name,
            description: self.description,
            status: self.status,
            icon: self.icon,
            timestamp: Some(at),
        }
    }
}

/// `(id, name, description, icon)` of the fixed pipeline template.
const TEMPLATE: [(&str, &str, &str, &str); 5] = [
    (
        "question_processing",
        "Question Processing",
        "Analyzing and understanding your question...",
        "🤔",
    ),
    (
        "document_retrieval",
        "Document Retrieval",
        "Searching through documents for relevant information...",
        "🔍",
    ),
    (
        "context_generation",
        "Context Generation",
        "Organizing relevant information to answer your question...",
        "📝",
    ),
    (
        "response_generation",
        "Response Generation",
        "Generating a comprehensive answer...",
        "💭",
    ),
    (
        "memory_saving",
        "Memory Saving",
        "Saving conversation for future reference...",
        "💾",
    ),
];

/// The five pipeline stages every exchange starts with, all pending.
pub fn default_stages() -> Vec<ProcessingStage> {
    TEMPLATE
        .iter()
        .map(|(id, name, description, icon)| ProcessingStage {
            id: StageId::from_static(id),
            name: (*name).to_string(),
            description: (*description).to_string(),
            status: StageStatus::Pending,
            icon: Some((*icon).to_string()),
            timestamp: None,
        })
        .collect()
}
