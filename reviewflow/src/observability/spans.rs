//! Span attributes for review runs and stages.

use crate::config::{ModelId, Temperature};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for one review run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSpanAttributes {
    /// Pipeline name.
    pub pipeline_name: Option<String>,
    /// Run id.
    pub run_id: Option<String>,
    /// Artifact display name.
    pub artifact_name: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Number of stages.
    pub stage_count: Option<usize>,
    /// Final run status.
    pub status: Option<String>,
}

impl RunSpanAttributes {
    /// Creates new run span attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline name.
    #[must_use]
    pub fn with_pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = Some(name.into());
        self
    }

    /// Sets the run id.
    #[must_use]
    pub fn with_run_id(mut self, id: impl Into<String>) -> Self {
        self.run_id = Some(id.into());
        self
    }

    /// Sets the artifact name.
    #[must_use]
    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    /// Sets model and temperature.
    #[must_use]
    pub fn with_model(mut self, model: ModelId, temperature: Temperature) -> Self {
        self.model = Some(model.to_string());
        self.temperature = Some(temperature.value());
        self
    }

    /// Sets the stage count.
    #[must_use]
    pub fn with_stage_count(mut self, count: usize) -> Self {
        self.stage_count = Some(count);
        self
    }

    /// Sets the final status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        if let Some(ref v) = self.pipeline_name {
            attrs.insert("pipeline.name".to_string(), v.clone());
        }
        if let Some(ref v) = self.run_id {
            attrs.insert("pipeline.run_id".to_string(), v.clone());
        }
        if let Some(ref v) = self.artifact_name {
            attrs.insert("artifact.name".to_string(), v.clone());
        }
        if let Some(ref v) = self.model {
            attrs.insert("llm.model".to_string(), v.clone());
        }
        if let Some(v) = self.temperature {
            attrs.insert("llm.temperature".to_string(), v.to_string());
        }
        if let Some(v) = self.stage_count {
            attrs.insert("pipeline.stage_count".to_string(), v.to_string());
        }
        if let Some(ref v) = self.status {
            attrs.insert("pipeline.status".to_string(), v.clone());
        }

        attrs
    }
}

/// Span attributes for stage execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSpanAttributes {
    /// Stage id.
    pub stage_id: String,
    /// Persona role.
    pub persona_role: Option<String>,
    /// Stage status.
    pub status: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
    /// Prompt length in characters.
    pub prompt_chars: Option<usize>,
}

impl StageSpanAttributes {
    /// Creates new stage span attributes.
    #[must_use]
    pub fn new(stage_id: impl Into<String>) -> Self {
        Self {
            stage_id: stage_id.into(),
            ..Default::default()
        }
    }

    /// Sets the persona role.
    #[must_use]
    pub fn with_persona_role(mut self, role: impl Into<String>) -> Self {
        self.persona_role = Some(role.into());
        self
    }

    /// Sets the stage status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the prompt length.
    #[must_use]
    pub fn with_prompt_chars(mut self, chars: usize) -> Self {
        self.prompt_chars = Some(chars);
        self
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("stage.id".to_string(), self.stage_id.clone());

        if let Some(ref v) = self.persona_role {
            attrs.insert("stage.persona".to_string(), v.clone());
        }
        if let Some(ref v) = self.status {
            attrs.insert("stage.status".to_string(), v.clone());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("stage.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("stage.error".to_string(), v.clone());
        }
        if let Some(v) = self.prompt_chars {
            attrs.insert("stage.prompt_chars".to_string(), v.to_string());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
