//! Testing utilities for reviewflow pipelines.
//!
//! This module provides:
//! - A scripted generator with per-stage outputs and failures
//! - Run and progress assertions
//! - Pipeline fixtures and a harness wiring them into an engine

mod assertions;
mod fixtures;
mod mocks;

pub use crate::progress::CollectingProgressReporter;
pub use assertions::{
    assert_progress_monotonic, assert_run_cancelled, assert_run_completed, assert_run_failed_at,
    assert_stage_status,
};
pub use fixtures::{linear_pipeline, sample_artifact, stage, TestHarness};
pub use mocks::ScriptedGenerator;
