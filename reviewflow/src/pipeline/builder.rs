//! Pipeline builder with validation.

use super::{PipelineDefinition, StageDefinition};
use crate::errors::ReviewflowError;

/// Builder for creating validated pipelines.
///
/// Stages may be declared in any order; the dependency graph is checked as a
/// whole when [`build`](Self::build) is called.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// The stage definitions, in insertion order.
    stages: Vec<StageDefinition>,
    /// Optional output stage.
    output_stage: Option<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            output_stage: None,
        }
    }

    /// Adds a stage to the pipeline.
    #[must_use]
    pub fn stage(mut self, stage: StageDefinition) -> Self {
        self.stages.push(stage);
        self
    }

    /// Adds a stage through a mutable reference.
    pub fn add_stage(&mut self, stage: StageDefinition) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Designates the stage whose output becomes the final report.
    #[must_use]
    pub fn output_stage(mut self, stage_id: impl Into<String>) -> Self {
        self.output_stage = Some(stage_id.into());
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds and validates the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an assembly error if the pipeline is empty, has duplicate ids,
    /// references unknown stages, or contains a cycle.
    pub fn build(self) -> Result<PipelineDefinition, ReviewflowError> {
        let mut pipeline = PipelineDefinition::new(self.name, self.stages);
        if let Some(output) = self.output_stage {
            pipeline = pipeline.with_output_stage(output);
        }
        pipeline.validate()?;
        Ok(pipeline)
    }
}
