//! Per-stage result record.

use super::StageStatus;
use crate::errors::GenerationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The recorded outcome of one stage within a run.
///
/// `output` is present only when the stage succeeded and `error` only when it
/// failed. Fields are read-only outside the crate; only the execution engine
/// moves a result between states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// The stage id.
    stage_id: String,
    /// Current status.
    status: StageStatus,
    /// Generated text, set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    /// Generator error, set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<GenerationError>,
    /// When the stage entered `Running`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    /// Wall time spent in the generator, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_ms: Option<f64>,
}

impl StageResult {
    /// Creates a pending result.
    #[must_use]
    pub fn pending(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            status: StageStatus::Pending,
            output: None,
            error: None,
            started_at: None,
            duration_ms: None,
        }
    }

    /// The stage id.
    #[must_use]
    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> StageStatus {
        self.status
    }

    /// Generated text, set on success.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Generator error, set on failure.
    #[must_use]
    pub fn error(&self) -> Option<&GenerationError> {
        self.error.as_ref()
    }

    /// When the stage entered `Running`.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Wall time spent in the generator, in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> Option<f64> {
        self.duration_ms
    }

    /// Returns the output if the stage succeeded.
    #[must_use]
    pub fn succeeded_output(&self) -> Option<&str> {
        match self.status {
            StageStatus::Succeeded => self.output.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn mark_running(&mut self) {
        debug_assert!(self.status.can_transition_to(StageStatus::Running));
        self.status = StageStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub(crate) fn mark_succeeded(&mut self, output: String, duration_ms: f64) {
        debug_assert!(self.status.can_transition_to(StageStatus::Succeeded));
        self.status = StageStatus::Succeeded;
        self.output = Some(output);
        self.duration_ms = Some(duration_ms);
    }

    pub(crate) fn mark_failed(&mut self, error: GenerationError, duration_ms: f64) {
        debug_assert!(self.status.can_transition_to(StageStatus::Failed));
        self.status = StageStatus::Failed;
        self.error = Some(error);
        self.duration_ms = Some(duration_ms);
    }
}
