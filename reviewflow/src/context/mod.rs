//! Prompt construction for pipeline stages.
//!
//! This module provides:
//! - Template rendering with artifact placeholders
//! - The context aggregator that appends upstream stage outputs

mod aggregator;
mod template;

pub use aggregator::{build_prompt, build_prompt_with_path, CONTEXT_HEADING};
pub use template::{
    placeholders, render_template, ARTIFACT_CONTENT, ARTIFACT_NAME, ARTIFACT_PATH,
    EXPECTED_OUTPUT, STAGE_ID,
};
