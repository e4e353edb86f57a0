//! Mutable per-run record of stage status and output.

use crate::core::{Artifact, RunStatus, StageResult};
use crate::errors::GenerationError;
use crate::history::ReviewRecord;
use crate::pipeline::PipelineDefinition;
use crate::utils::{generate_run_id, now_utc, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// State of one pipeline run.
///
/// Owned by a single run; only the engine mutates it. Callers receive it
/// back once the run reaches a terminal status.
#[derive(Debug, Clone)]
pub struct RunState {
    run_id: Uuid,
    pipeline_name: String,
    artifact: Arc<Artifact>,
    order: Vec<String>,
    results: HashMap<String, StageResult>,
    status: RunStatus,
    started_at: Timestamp,
    finished_at: Option<Timestamp>,
    failed_stage: Option<String>,
    cancel_reason: Option<String>,
    record: Option<Arc<ReviewRecord>>,
}

impl RunState {
    /// Creates a run with every stage pending, in declaration order.
    #[must_use]
    pub fn new(pipeline: &PipelineDefinition, artifact: Arc<Artifact>) -> Self {
        let order: Vec<String> = pipeline.stages().iter().map(|s| s.id.clone()).collect();
        let results = order
            .iter()
            .map(|id| (id.clone(), StageResult::pending(id)))
            .collect();
        Self {
            run_id: generate_run_id(),
            pipeline_name: pipeline.name().to_string(),
            artifact,
            order,
            results,
            status: RunStatus::NotStarted,
            started_at: now_utc(),
            finished_at: None,
            failed_stage: None,
            cancel_reason: None,
            record: None,
        }
    }

    /// Unique id of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Name of the pipeline being run.
    #[must_use]
    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    /// The artifact under review.
    #[must_use]
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Stage ids in execution order.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Result of one stage.
    #[must_use]
    pub fn result(&self, stage_id: &str) -> Option<&StageResult> {
        self.results.get(stage_id)
    }

    /// All stage results in execution order.
    pub fn results(&self) -> impl Iterator<Item = &StageResult> {
        self.order.iter().filter_map(|id| self.results.get(id))
    }

    /// Output of a succeeded stage.
    #[must_use]
    pub fn output_of(&self, stage_id: &str) -> Option<&str> {
        self.result(stage_id).and_then(StageResult::succeeded_output)
    }

    /// Overall run status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// When the run was created.
    #[must_use]
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// When the run reached a terminal status.
    #[must_use]
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    /// The stage that failed, if the run failed.
    #[must_use]
    pub fn failed_stage(&self) -> Option<&str> {
        self.failed_stage.as_deref()
    }

    /// The generator error that aborted the run.
    #[must_use]
    pub fn error(&self) -> Option<&GenerationError> {
        self.failed_stage
            .as_deref()
            .and_then(|id| self.result(id))
            .and_then(StageResult::error)
    }

    /// Why the run was cancelled.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// The review record, present only once the run completed.
    #[must_use]
    pub fn record(&self) -> Option<&Arc<ReviewRecord>> {
        self.record.as_ref()
    }

    pub(crate) fn start(&mut self, order: Vec<String>) {
        self.order = order;
        self.status = RunStatus::Running;
    }

    pub(crate) fn mark_running(&mut self, stage_id: &str) {
        if let Some(r) = self.results.get_mut(stage_id) {
            r.mark_running();
        }
    }

    pub(crate) fn mark_succeeded(&mut self, stage_id: &str, output: String, duration_ms: f64) {
        if let Some(r) = self.results.get_mut(stage_id) {
            r.mark_succeeded(output, duration_ms);
        }
    }

    pub(crate) fn mark_failed(&mut self, stage_id: &str, error: GenerationError, duration_ms: f64) {
        if let Some(r) = self.results.get_mut(stage_id) {
            r.mark_failed(error, duration_ms);
        }
        self.failed_stage = Some(stage_id.to_string());
        self.finish(RunStatus::Failed);
    }

    pub(crate) fn mark_cancelled(&mut self, reason: String) {
        self.cancel_reason = Some(reason);
        self.finish(RunStatus::Cancelled);
    }

    pub(crate) fn complete(&mut self, record: Arc<ReviewRecord>) {
        self.record = Some(record);
        self.finish(RunStatus::Completed);
    }

    fn finish(&mut self, status: RunStatus) {
        debug_assert!(!self.status.is_terminal());
        self.status = status;
        self.finished_at = Some(now_utc());
    }

    #[cfg(test)]
    pub(crate) fn record_success(&mut self, stage_id: &str, output: String, duration_ms: f64) {
        self.mark_running(stage_id);
        self.mark_succeeded(stage_id, output, duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Persona, StageStatus};
    use crate::pipeline::StageDefinition;

    fn pipeline() -> PipelineDefinition {
        let persona = Persona::new("r", "g", "b");
        PipelineDefinition::new(
            "p",
            vec![
                StageDefinition::new("a", persona.clone(), "A"),
                StageDefinition::new("b", persona, "B").with_dependency("a"),
            ],
        )
    }

    #[test]
    fn test_new_run_is_pending() {
        let run = RunState::new(&pipeline(), Arc::new(Artifact::new("x.py", "")));
        assert_eq!(run.status(), RunStatus::NotStarted);
        assert_eq!(run.order(), ["a", "b"]);
        assert!(run.results().all(|r| r.status() == StageStatus::Pending));
        assert!(run.record().is_none());
        assert_eq!(run.run_id().get_version_num(), 7);
    }

    #[test]
    fn test_failure_records_stage_and_error() {
        let mut run = RunState::new(&pipeline(), Arc::new(Artifact::new("x.py", "")));
        run.start(vec!["a".into(), "b".into()]);
        run.record_success("a", "ok".into(), 1.0);
        run.mark_running("b");
        run.mark_failed("b", GenerationError::rate_limited("quota"), 2.0);

        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.failed_stage(), Some("b"));
        assert_eq!(run.error().unwrap().message, "quota");
        assert_eq!(run.output_of("a"), Some("ok"));
        assert!(run.output_of("b").is_none());
        assert!(run.finished_at().is_some());
    }

    #[test]
    fn test_cancel() {
        let mut run = RunState::new(&pipeline(), Arc::new(Artifact::new("x.py", "")));
        run.start(vec!["a".into(), "b".into()]);
        run.mark_cancelled("timeout".into());

        assert_eq!(run.status(), RunStatus::Cancelled);
        assert_eq!(run.cancel_reason(), Some("timeout"));
        assert!(run.error().is_none());
    }
}
