//! Core domain model types for reviewflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Stage and run status enums
//! - Persona metadata
//! - The artifact under review
//! - Per-stage results

mod artifact;
mod persona;
mod result;
mod status;

pub use artifact::{Artifact, StagedArtifact};
pub use persona::Persona;
pub use result::StageResult;
pub use status::{RunStatus, StageStatus};
