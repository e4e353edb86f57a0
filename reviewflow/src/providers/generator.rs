//! The text generation seam.

use crate::config::{ApiKey, ModelId, Temperature};
use crate::core::Persona;
use crate::errors::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything a generator needs for one stage.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Id of the stage issuing the request.
    pub stage_id: String,
    /// Fully built prompt.
    pub prompt: String,
    /// Persona of the stage.
    pub persona: Persona,
    /// Model to use.
    pub model: ModelId,
    /// Sampling temperature.
    pub temperature: Temperature,
    /// Credentials, passed through untouched.
    pub credentials: Option<ApiKey>,
}

/// Generated text plus provider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated text.
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Provider name.
    pub provider: String,
    /// Prompt tokens, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    /// Generated tokens, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    /// Why generation stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerationResponse {
    /// Creates a response carrying only text.
    #[must_use]
    pub fn text(text: impl Into<String>, model: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            provider: provider.into(),
            input_tokens: None,
            output_tokens: None,
            finish_reason: None,
        }
    }

    /// Returns total tokens, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens
            .unwrap_or(0)
            .saturating_add(self.output_tokens.unwrap_or(0))
    }

    /// Converts to span attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("llm.model".to_string(), serde_json::json!(self.model));
        map.insert("llm.provider".to_string(), serde_json::json!(self.provider));
        if let Some(t) = self.input_tokens {
            map.insert("llm.input_tokens".to_string(), serde_json::json!(t));
        }
        if let Some(t) = self.output_tokens {
            map.insert("llm.output_tokens".to_string(), serde_json::json!(t));
        }
        map.insert("llm.total_tokens".to_string(), serde_json::json!(self.total_tokens()));
        map
    }
}

/// External text generation service.
///
/// A call is atomic from the engine's point of view: it is awaited to
/// completion and never retried by the engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates text for one stage.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}
