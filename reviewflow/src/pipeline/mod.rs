//! Pipeline assembly and sequencing.
//!
//! This module provides:
//! - Stage definitions with data dependencies and sequencing constraints
//! - Pipeline definitions with validation and deterministic ordering
//! - A builder that validates the graph as a whole

mod builder;
mod dag;
mod spec;

pub use builder::PipelineBuilder;
pub use dag::PipelineDefinition;
pub use spec::StageDefinition;
