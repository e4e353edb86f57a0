//! # Reviewflow
//!
//! A stage-dependency execution engine for multi-persona code review.
//!
//! Reviewflow runs a pipeline of text-analysis stages over one source
//! artifact. Each stage has a persona and a prompt template, and it can
//! declare dependencies on earlier stages. Dependency outputs are folded
//! into the stage's prompt, and the last stage's output becomes the review
//! record. The crate provides:
//!
//! - **Sequencing**: validated dependency graphs with a deterministic order
//! - **Context aggregation**: prompts built from the artifact and upstream outputs
//! - **Abort-on-first-failure execution** against a pluggable [`providers::Generator`]
//! - **Progress reporting**: monotonic percentages for an observer
//! - **History**: an append-only store of completed review records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reviewflow::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = code_review_pipeline()?;
//! let generator = Arc::new(GeminiGenerator::new(GeminiConfig::default())?);
//! let history = Arc::new(HistoryStore::new());
//!
//! let engine = ExecutionEngine::new(generator, history.clone())
//!     .with_config(ReviewConfig::from_env()?)
//!     .with_reporter(Arc::new(LoggingProgressReporter::info()));
//!
//! let run = engine.run(&pipeline, Arc::new(Sample::SecurityIssues.artifact())).await?;
//! if let Some(record) = run.record() {
//!     println!("{}", record.content());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod context;
pub mod core;
pub mod engine;
pub mod errors;
pub mod history;
pub mod observability;
pub mod pipeline;
pub mod progress;
pub mod providers;
pub mod review;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{ApiKey, ModelId, ReviewConfig, Temperature};
    pub use crate::context::build_prompt;
    pub use crate::core::{Artifact, Persona, RunStatus, StageResult, StageStatus};
    pub use crate::engine::{ExecutionEngine, RunState};
    pub use crate::errors::{
        ContractErrorInfo, CycleDetectedError, GenerationError, GenerationErrorKind,
        MissingDependencyOutputError, PipelineValidationError, ReviewflowError,
        UnknownDependencyError,
    };
    pub use crate::history::{HistoryStore, ReviewRecord};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{PipelineBuilder, PipelineDefinition, StageDefinition};
    pub use crate::progress::{
        LoggingProgressReporter, NoOpProgressReporter, ProgressReporter, ProgressSchedule,
    };
    #[cfg(feature = "gemini")]
    pub use crate::providers::{GeminiConfig, GeminiGenerator};
    pub use crate::providers::{GenerationRequest, GenerationResponse, Generator};
    pub use crate::review::{code_review_pipeline, Sample};
    pub use crate::utils::{iso_timestamp, Timestamp};
}
