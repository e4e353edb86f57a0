//! Error types for the reviewflow engine.
//!
//! The taxonomy splits into three families:
//!
//! - **Assembly errors** ([`PipelineValidationError`], [`CycleDetectedError`],
//!   [`UnknownDependencyError`]) are raised before any stage executes and
//!   indicate a programming error in pipeline construction.
//! - **Generation errors** ([`GenerationError`]) come from the external text
//!   generation service. They abort the run and are the only errors meant to
//!   be shown to an end user.
//! - **Invariant violations** ([`MissingDependencyOutputError`]) mean the
//!   engine itself is broken and are never recovered from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for reviewflow operations.
#[derive(Debug, Error)]
pub enum ReviewflowError {
    /// A pipeline validation error occurred.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A cycle was detected in the pipeline.
    #[error("{0}")]
    CycleDetected(#[from] CycleDetectedError),

    /// A stage depends on a stage that was never defined.
    #[error("{0}")]
    UnknownDependency(#[from] UnknownDependencyError),

    /// The context aggregator ran before a dependency had succeeded.
    #[error("Invariant violation: {0}")]
    MissingDependencyOutput(#[from] MissingDependencyOutputError),

    /// The external generator failed.
    #[error("{0}")]
    Generation(#[from] GenerationError),

    /// Invalid run configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewflowError {
    /// Returns true for errors that indicate a bug rather than a runtime condition.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::CycleDetected(_)
                | Self::UnknownDependency(_)
                | Self::MissingDependencyOutput(_)
        )
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-004-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the contract error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised when a cycle is detected in the pipeline graph.
#[derive(Debug, Clone, Error)]
#[error("Cycle detected in pipeline: {}", cycle_path.join(" -> "))]
pub struct CycleDetectedError {
    /// The path of stages forming the cycle, first stage repeated at the end.
    pub cycle_path: Vec<String>,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(cycle_path: Vec<String>) -> Self {
        let info = ContractErrorInfo::new(
            "CONTRACT-004-CYCLE",
            format!("Pipeline contains a dependency cycle: {}", cycle_path.join(" -> ")),
        )
        .with_fix_hint("Remove one of the dependencies in the cycle to break it.");

        Self {
            cycle_path,
            error_info: info,
        }
    }
}

/// Error raised when a stage names a dependency that is not defined.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' depends on unknown stage '{dependency}'")]
pub struct UnknownDependencyError {
    /// The stage declaring the dependency.
    pub stage: String,
    /// The dependency id that could not be resolved.
    pub dependency: String,
}

impl UnknownDependencyError {
    /// Creates a new unknown dependency error.
    #[must_use]
    pub fn new(stage: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            dependency: dependency.into(),
        }
    }
}

/// Raised when a prompt is built before every declared dependency succeeded.
#[derive(Debug, Clone, Error)]
#[error("stage '{stage}' requested output of '{dependency}' before it succeeded")]
pub struct MissingDependencyOutputError {
    /// The stage whose prompt was being built.
    pub stage: String,
    /// The dependency with no recorded output.
    pub dependency: String,
}

impl MissingDependencyOutputError {
    /// Creates a new missing dependency output error.
    #[must_use]
    pub fn new(stage: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            dependency: dependency.into(),
        }
    }
}

/// Cause category of a generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    /// The credentials were missing, malformed or rejected.
    InvalidCredentials,
    /// The service could not be reached (DNS, TLS, timeout, connection reset).
    Unreachable,
    /// Quota exhausted or rate limited.
    RateLimited,
    /// The model identifier is unknown to the service.
    InvalidModel,
    /// The service answered but produced no text.
    EmptyResponse,
    /// Any other service-side failure.
    Service,
}

impl GenerationErrorKind {
    /// Returns a short hint suitable for showing next to the error.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Check that your API key is valid.",
            Self::Unreachable => "Check your internet connectivity and try again.",
            Self::RateLimited => "The service is rate limiting requests; wait and retry.",
            Self::InvalidModel => "Make sure the selected model exists.",
            Self::EmptyResponse => "The model returned no text; try again or lower the temperature.",
            Self::Service => "The generation service reported an error; try again later.",
        }
    }
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Unreachable => write!(f, "service unreachable"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::InvalidModel => write!(f, "invalid model"),
            Self::EmptyResponse => write!(f, "empty response"),
            Self::Service => write!(f, "service error"),
        }
    }
}

/// Error returned by a [`Generator`](crate::providers::Generator).
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("Generation failed ({kind}): {message}")]
pub struct GenerationError {
    /// Cause category.
    pub kind: GenerationErrorKind,
    /// Detail from the service or transport.
    pub message: String,
    /// HTTP status code when the failure came from a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl GenerationError {
    /// Creates a new generation error.
    #[must_use]
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    /// Sets the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Creates an invalid credentials error.
    #[must_use]
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidCredentials, message)
    }

    /// Creates an unreachable error.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Unreachable, message)
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::RateLimited, message)
    }

    /// Creates an invalid model error.
    #[must_use]
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::InvalidModel, message)
    }

    /// Creates an empty response error.
    #[must_use]
    pub fn empty_response(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::EmptyResponse, message)
    }

    /// Creates a generic service error.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Service, message)
    }

    /// Returns a message for display, including the hint for the cause.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Error during review: {}. {}", self.message, self.kind.hint())
    }
}

/// Errors raised while building or loading a run configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Temperature outside `[0.0, 1.0]` or not finite.
    #[error("Temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f64),

    /// The model identifier is not one of the supported models.
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    /// An environment variable held an unparsable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Raw value.
        value: String,
    },
}
