//! Pipeline fixtures and an engine harness.

use std::sync::Arc;

use super::ScriptedGenerator;
use crate::config::ReviewConfig;
use crate::core::{Artifact, Persona};
use crate::engine::{ExecutionEngine, RunState};
use crate::errors::ReviewflowError;
use crate::history::HistoryStore;
use crate::pipeline::{PipelineDefinition, StageDefinition};
use crate::progress::CollectingProgressReporter;

/// Creates a stage with a generic persona and data dependencies.
#[must_use]
pub fn stage(id: &str, deps: &[&str]) -> StageDefinition {
    StageDefinition::new(
        id,
        Persona::new(format!("{id} reviewer"), format!("Review {id}"), "Thorough."),
        format!("Stage {id} reviewing {{artifact_name}}"),
    )
    .with_dependencies(deps.iter().copied())
}

/// Creates a chain where each stage depends on the previous one.
#[must_use]
pub fn linear_pipeline(ids: &[&str]) -> PipelineDefinition {
    let stages = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let deps: Vec<&str> = if i == 0 { vec![] } else { vec![ids[i - 1]] };
            stage(id, &deps)
        })
        .collect();
    PipelineDefinition::new("linear", stages)
}

/// A small Python artifact.
#[must_use]
pub fn sample_artifact() -> Arc<Artifact> {
    Arc::new(Artifact::new("sample.py", "def add(a, b):\n    return a + b\n"))
}

/// An engine wired to a scripted generator, a collecting reporter and a
/// fresh history store.
#[derive(Debug, Clone)]
pub struct TestHarness {
    /// The engine under test.
    pub engine: ExecutionEngine,
    /// The generator the engine calls.
    pub generator: Arc<ScriptedGenerator>,
    /// Progress events emitted by the engine.
    pub reporter: Arc<CollectingProgressReporter>,
    /// History the engine appends to.
    pub history: Arc<HistoryStore>,
}

impl TestHarness {
    /// Creates a harness around `generator` with default configuration.
    #[must_use]
    pub fn new(generator: ScriptedGenerator) -> Self {
        Self::with_config(generator, ReviewConfig::default())
    }

    /// Creates a harness with a specific configuration.
    #[must_use]
    pub fn with_config(generator: ScriptedGenerator, config: ReviewConfig) -> Self {
        let generator = Arc::new(generator);
        let reporter = Arc::new(CollectingProgressReporter::new());
        let history = Arc::new(HistoryStore::new());
        let engine = ExecutionEngine::new(generator.clone(), Arc::clone(&history))
            .with_reporter(reporter.clone())
            .with_config(config);
        Self {
            engine,
            generator,
            reporter,
            history,
        }
    }

    /// Runs `pipeline` over the sample artifact.
    ///
    /// # Errors
    ///
    /// Propagates engine errors.
    pub async fn run(&self, pipeline: &PipelineDefinition) -> Result<RunState, ReviewflowError> {
        self.engine.run(pipeline, sample_artifact()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_progress_monotonic, assert_run_completed};

    #[test]
    fn test_linear_pipeline_fixture() {
        let pipeline = linear_pipeline(&["a", "b", "c"]);
        assert_eq!(pipeline.order().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(pipeline.stage("c").unwrap().dependencies, vec!["b"]);
    }

    #[tokio::test]
    async fn test_harness_runs_pipeline() {
        let harness = TestHarness::new(ScriptedGenerator::new());
        let run = harness.run(&linear_pipeline(&["a", "b"])).await.unwrap();

        assert_run_completed(&run);
        assert_eq!(harness.generator.called_stages(), vec!["a", "b"]);
        assert_eq!(harness.history.count(), 1);
        assert_progress_monotonic(&harness.reporter);
    }
}
