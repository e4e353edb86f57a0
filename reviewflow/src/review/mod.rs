//! The built-in five-stage code review.
//!
//! [`code_review_pipeline`] wires five personas: a quality pass that every
//! other stage reads, security, performance and documentation passes, and a
//! synthesis that combines all four into the final report.

mod samples;
mod stages;

pub use samples::{is_supported_extension, pasted_artifact, Sample, PASTED_NAME, SUPPORTED_EXTENSIONS};
pub use stages::{
    code_review_pipeline, code_review_stages, DOCUMENTATION, PERFORMANCE, PIPELINE_NAME, QUALITY,
    SECURITY, SYNTHESIS,
};
