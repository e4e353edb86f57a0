//! Text generation providers.
//!
//! The engine only sees the [`Generator`] trait. The Gemini adapter is
//! compiled in with the `gemini` feature.

mod generator;

#[cfg(feature = "gemini")]
mod gemini;

pub use generator::{GenerationRequest, GenerationResponse, Generator};

#[cfg(test)]
pub use generator::MockGenerator;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiGenerator};
