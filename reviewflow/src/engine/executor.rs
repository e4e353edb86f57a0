//! Sequential execution of a validated pipeline.

use super::RunState;
use crate::cancellation::CancellationToken;
use crate::config::ReviewConfig;
use crate::context::build_prompt_with_path;
use crate::core::{Artifact, StagedArtifact};
use crate::errors::{MissingDependencyOutputError, PipelineValidationError, ReviewflowError};
use crate::history::{HistoryStore, ReviewRecord};
use crate::observability::{RunSpanAttributes, SpanTimer, StageSpanAttributes};
use crate::pipeline::PipelineDefinition;
use crate::progress::{NoOpProgressReporter, ProgressReporter, ProgressSchedule};
use crate::providers::{GenerationRequest, Generator};
use crate::utils::now_utc;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Drives a pipeline's stages against a [`Generator`].
///
/// Stages run strictly one after another in sequencer order. The first
/// generator failure aborts the run: no later stage starts and no record is
/// produced. A completed run appends exactly one [`ReviewRecord`] to the
/// shared [`HistoryStore`].
#[derive(Clone)]
pub struct ExecutionEngine {
    generator: Arc<dyn Generator>,
    reporter: Arc<dyn ProgressReporter>,
    history: Arc<HistoryStore>,
    config: ReviewConfig,
}

impl ExecutionEngine {
    /// Creates an engine with default configuration and no progress observer.
    #[must_use]
    pub fn new(generator: Arc<dyn Generator>, history: Arc<HistoryStore>) -> Self {
        Self {
            generator,
            reporter: Arc::new(NoOpProgressReporter),
            history,
            config: ReviewConfig::default(),
        }
    }

    /// Sets the progress observer.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets the run configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReviewConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Returns the history store records are appended to.
    #[must_use]
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Runs every stage of `pipeline` over `artifact`.
    ///
    /// A generator failure is not an `Err`: the returned state has status
    /// `Failed` and carries the error on the failing stage.
    ///
    /// # Errors
    ///
    /// - Assembly errors if the pipeline is invalid. No stage runs.
    /// - `MissingDependencyOutput` if a prompt is built before its inputs
    ///   exist. This is an engine bug.
    /// - `Io` if the artifact could not be written to a temporary file.
    pub async fn run(
        &self,
        pipeline: &PipelineDefinition,
        artifact: Arc<Artifact>,
    ) -> Result<RunState, ReviewflowError> {
        self.run_with_cancellation(pipeline, artifact, &CancellationToken::new())
            .await
    }

    /// Runs the pipeline, checking `token` before each stage starts.
    ///
    /// A cancelled run ends with status `Cancelled`. A generator call that is
    /// already in flight is awaited to completion first.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub async fn run_with_cancellation(
        &self,
        pipeline: &PipelineDefinition,
        artifact: Arc<Artifact>,
        token: &CancellationToken,
    ) -> Result<RunState, ReviewflowError> {
        let order = pipeline.order()?;
        let output_stage = pipeline.output_stage()?;

        let mut run = RunState::new(pipeline, artifact);
        let attrs = RunSpanAttributes::new()
            .with_pipeline_name(pipeline.name())
            .with_run_id(run.run_id().to_string())
            .with_artifact_name(&run.artifact().name)
            .with_model(self.config.model, self.config.temperature)
            .with_stage_count(order.len());
        let span = info_span!(
            "review_run",
            run_id = %run.run_id(),
            pipeline = %pipeline.name(),
            model = %self.config.model,
        );

        async {
            debug!(attributes = ?attrs.to_otel_attributes(), "Run starting");
            run.start(order);
            self.execute(pipeline, &mut run, &output_stage, token).await?;

            let attrs = attrs.with_status(run.status().to_string());
            info!(
                status = %run.status(),
                history_size = self.history.count(),
                attributes = ?attrs.to_otel_attributes(),
                "Run finished"
            );
            Ok(run)
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        pipeline: &PipelineDefinition,
        run: &mut RunState,
        output_stage: &str,
        token: &CancellationToken,
    ) -> Result<(), ReviewflowError> {
        let order = run.order().to_vec();
        let total = order.len();
        let schedule = ProgressSchedule::new(total);

        // Dropped on every exit path, which deletes the file.
        let staged: Option<StagedArtifact> = if pipeline.needs_artifact_file() {
            Some(run.artifact().stage()?)
        } else {
            None
        };
        let artifact_path = staged.as_ref().and_then(StagedArtifact::path);

        let mut percent = schedule.initialized();
        self.reporter
            .on_progress(percent, &format!("Initializing {total} review stages"));

        for (index, stage_id) in order.iter().enumerate() {
            if token.is_cancelled() {
                let reason = token.reason().unwrap_or_else(|| "cancelled".to_string());
                warn!(stage = %stage_id, %reason, "Run cancelled before stage");
                run.mark_cancelled(reason.clone());
                self.reporter
                    .on_progress(percent, &format!("Review cancelled: {reason}"));
                return Ok(());
            }

            let stage = pipeline.stage(stage_id).ok_or_else(|| {
                PipelineValidationError::new(format!("Stage '{stage_id}' is not defined"))
                    .with_stages(vec![stage_id.clone()])
            })?;

            run.mark_running(stage_id);
            percent = schedule.stage_started(index);
            self.reporter.on_progress(
                percent,
                &format!("Stage {}/{}: {} at work", index + 1, total, stage.persona.role),
            );

            let prompt = build_prompt_with_path(stage, run, artifact_path).map_err(|e| {
                error!(stage = %stage_id, dependency = %e.dependency, "Prompt built before dependency output existed");
                e
            })?;

            let request = GenerationRequest {
                stage_id: stage_id.clone(),
                prompt,
                persona: stage.persona.clone(),
                model: self.config.model,
                temperature: self.config.temperature,
                credentials: self.config.credentials.clone(),
            };
            let attrs = StageSpanAttributes::new(stage_id)
                .with_persona_role(&stage.persona.role)
                .with_prompt_chars(request.prompt.chars().count());

            let timer = SpanTimer::start(stage_id);
            let outcome = self
                .generator
                .generate(&request)
                .instrument(info_span!("stage", stage = %stage_id, index))
                .await;
            let duration_ms = timer.finish();

            match outcome {
                Ok(response) => {
                    debug!(
                        stage = %stage_id,
                        duration_ms,
                        tokens = response.total_tokens(),
                        attributes = ?attrs.with_status("succeeded").with_duration_ms(duration_ms).to_otel_attributes(),
                        "Stage succeeded"
                    );
                    run.mark_succeeded(stage_id, response.text, duration_ms);
                    percent = schedule.stage_finished(index);
                    self.reporter.on_progress(
                        percent,
                        &format!("Stage {}/{}: '{}' complete", index + 1, total, stage_id),
                    );
                }
                Err(err) => {
                    warn!(
                        stage = %stage_id,
                        kind = %err.kind,
                        duration_ms,
                        attributes = ?attrs.with_status("failed").with_duration_ms(duration_ms).with_error(err.to_string()).to_otel_attributes(),
                        "Stage failed, aborting run"
                    );
                    let message = format!("Review failed at '{}': {}", stage_id, err.user_message());
                    run.mark_failed(stage_id, err, duration_ms);
                    self.reporter.on_progress(percent, &message);
                    return Ok(());
                }
            }
        }

        let content = run
            .output_of(output_stage)
            .ok_or_else(|| MissingDependencyOutputError::new(pipeline.name(), output_stage))?
            .to_string();

        let record = ReviewRecord::new(
            run.run_id(),
            content,
            run.artifact(),
            self.config.model,
            self.config.temperature,
            now_utc(),
        );
        let record = self.history.append(record);
        run.complete(record);

        if let Some(staged) = staged {
            if let Err(e) = staged.release() {
                warn!("Failed to remove staged artifact: {}", e);
            }
        }

        self.reporter.on_progress(schedule.completed(), "Review complete");
        Ok(())
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("config", &self.config)
            .field("history_size", &self.history.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Persona, RunStatus};
    use crate::errors::GenerationError;
    use crate::pipeline::StageDefinition;
    use crate::providers::{GenerationResponse, MockGenerator};

    fn two_stage() -> PipelineDefinition {
        let persona = Persona::new("Analyst", "Analyze", "Experienced.");
        PipelineDefinition::new(
            "pair",
            vec![
                StageDefinition::new("a", persona.clone(), "Look at {artifact_name}"),
                StageDefinition::new("b", persona, "Summarize").with_dependency("a"),
            ],
        )
    }

    #[tokio::test]
    async fn test_mock_generator_called_in_order() {
        let mut mock = MockGenerator::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_generate()
            .withf(|req| req.stage_id == "a")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(GenerationResponse::text("found 2 issues", "m", "mock")));
        mock.expect_generate()
            .withf(|req| req.stage_id == "b" && req.prompt.contains("found 2 issues"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(GenerationResponse::text("summary", "m", "mock")));

        let history = Arc::new(HistoryStore::new());
        let engine = ExecutionEngine::new(Arc::new(mock), Arc::clone(&history));
        let run = engine
            .run(&two_stage(), Arc::new(Artifact::new("x.py", "pass")))
            .await
            .unwrap();

        assert_eq!(run.status(), RunStatus::Completed);
        assert_eq!(run.record().unwrap().content(), "summary");
        assert_eq!(history.count(), 1);
    }

    #[tokio::test]
    async fn test_credentials_and_config_are_forwarded() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .withf(|req| {
                req.credentials.as_ref().map(|k| k.expose()) == Some("secret")
                    && req.model == crate::config::ModelId::Gemini25Pro
                    && req.persona.role == "Analyst"
            })
            .times(2)
            .returning(|_| Ok(GenerationResponse::text("ok", "m", "mock")));

        let config = ReviewConfig::new()
            .with_model(crate::config::ModelId::Gemini25Pro)
            .with_credentials(crate::config::ApiKey::new("secret"));
        let engine = ExecutionEngine::new(Arc::new(mock), Arc::new(HistoryStore::new()))
            .with_config(config);

        let run = engine
            .run(&two_stage(), Arc::new(Artifact::new("x.py", "pass")))
            .await
            .unwrap();
        assert!(run.status().is_success());
    }

    #[tokio::test]
    async fn test_failure_is_not_an_err() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(GenerationError::unreachable("connection refused")));

        let history = Arc::new(HistoryStore::new());
        let engine = ExecutionEngine::new(Arc::new(mock), Arc::clone(&history));
        let run = engine
            .run(&two_stage(), Arc::new(Artifact::new("x.py", "pass")))
            .await
            .unwrap();

        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.failed_stage(), Some("a"));
        assert!(run.record().is_none());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pipeline_runs_nothing() {
        let mut mock = MockGenerator::new();
        mock.expect_generate().times(0);

        let persona = Persona::new("r", "g", "b");
        let pipeline = PipelineDefinition::new(
            "broken",
            vec![StageDefinition::new("a", persona, "A").with_dependency("ghost")],
        );
        let engine = ExecutionEngine::new(Arc::new(mock), Arc::new(HistoryStore::new()));
        let err = engine
            .run(&pipeline, Arc::new(Artifact::new("x.py", "")))
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewflowError::UnknownDependency(_)));
        assert!(err.is_fatal());
    }
}
