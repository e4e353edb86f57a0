//! Gemini `generateContent` client.

use super::{GenerationRequest, GenerationResponse, Generator};
use crate::errors::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "gemini";

/// Configuration for the Gemini client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> f64 {
    120.0
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl GeminiConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_seconds` is negative, NaN or too large.
    pub fn timeout(&self) -> Result<Duration, GenerationError> {
        Duration::try_from_secs_f64(self.timeout_seconds).map_err(|e| {
            GenerationError::service(format!(
                "invalid timeout of {} seconds: {e}",
                self.timeout_seconds
            ))
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

/// [`Generator`] backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is invalid or the HTTP client cannot
    /// be constructed.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout()?)
            .build()
            .map_err(|e| GenerationError::service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let api_key = request
            .credentials
            .as_ref()
            .filter(|k| !k.is_blank())
            .ok_or_else(|| GenerationError::invalid_credentials("Missing API key"))?;

        let model = request.model.as_str();
        let body = GenerateContentRequest::from_request(request);

        debug!(stage = %request.stage_id, model, "Calling Gemini");

        let response = self
            .client
            .post(self.config.endpoint(model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text));
        }

        parse_response(&text, model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: request.persona.system_instruction() }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: request.prompt.clone() }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature.value(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn classify_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        GenerationError::unreachable(err.to_string())
    } else {
        GenerationError::service(err.to_string())
    }
}

/// Maps a non-success HTTP response to a generation error.
fn classify_status(status: u16, body: &str) -> GenerationError {
    let (message, api_status) = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| (body.trim().to_string(), String::new()),
        |env| (env.error.message, env.error.status),
    );

    let error = match status {
        401 | 403 => GenerationError::invalid_credentials(message),
        400 if message.contains("API key") || api_status == "UNAUTHENTICATED" => {
            GenerationError::invalid_credentials(message)
        }
        404 => GenerationError::invalid_model(message),
        429 => GenerationError::rate_limited(message),
        _ if api_status == "RESOURCE_EXHAUSTED" => GenerationError::rate_limited(message),
        _ => GenerationError::service(message),
    };
    error.with_status(status)
}

/// Extracts the text of the first candidate.
fn parse_response(body: &str, model: &str) -> Result<GenerationResponse, GenerationError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::service(format!("invalid response body: {e}")))?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::empty_response("response contained no candidates"))?;

    let text: String = candidate.content.parts.into_iter().map(|p| p.text).collect();
    if text.trim().is_empty() {
        return Err(GenerationError::empty_response(format!(
            "candidate had no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(GenerationResponse {
        text,
        model: model.to_string(),
        provider: PROVIDER.to_string(),
        input_tokens: parsed.usage_metadata.as_ref().and_then(|u| u.prompt_token_count),
        output_tokens: parsed.usage_metadata.as_ref().and_then(|u| u.candidates_token_count),
        finish_reason: candidate.finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ModelId, Temperature};
    use crate::core::Persona;
    use crate::errors::GenerationErrorKind;

    fn request(credentials: Option<ApiKey>) -> GenerationRequest {
        GenerationRequest {
            stage_id: "quality".to_string(),
            prompt: "Analyze this".to_string(),
            persona: Persona::new("Senior Code Quality Analyst", "Find bugs", "Veteran."),
            model: ModelId::Gemini25Pro,
            temperature: Temperature::new(0.5).unwrap(),
            credentials,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_request(&request(None))).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Analyze this");
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Senior Code Quality Analyst"));
        assert!(body["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig::default().with_base_url("http://localhost:8080/");
        assert_eq!(
            config.endpoint("gemini-2.5-pro"),
            "http://localhost:8080/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let config: GeminiConfig = serde_json::from_str(r#"{"timeout_seconds": 1e300}"#).unwrap();
        let err = GeminiGenerator::new(config).unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Service);
        assert!(err.message.contains("invalid timeout"));

        assert!(GeminiConfig::default().with_timeout(f64::INFINITY).timeout().is_err());
        assert!(GeminiConfig::default().with_timeout(-1.0).timeout().is_err());
        assert_eq!(
            GeminiConfig::default().with_timeout(2.5).timeout().unwrap(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Line 3: "}, {"text": "SQL injection"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
        }"#;
        let response = parse_response(body, "gemini-2.5-pro").unwrap();

        assert_eq!(response.text, "Line 3: SQL injection");
        assert_eq!(response.total_tokens(), 160);
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.provider, "gemini");
    }

    #[test]
    fn test_parse_empty_response() {
        let err = parse_response(r#"{"candidates": []}"#, "m").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::EmptyResponse);

        let err = parse_response(
            r#"{"candidates": [{"content": {"parts": []}, "finishReason": "SAFETY"}]}"#,
            "m",
        )
        .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::EmptyResponse);
        assert!(err.message.contains("SAFETY"));

        let err = parse_response("not json", "m").unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Service);
    }

    #[test]
    fn test_classify_status() {
        let invalid_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(classify_status(400, invalid_key).kind, GenerationErrorKind::InvalidCredentials);
        assert_eq!(classify_status(403, "{}").kind, GenerationErrorKind::InvalidCredentials);
        assert_eq!(classify_status(404, "model not found").kind, GenerationErrorKind::InvalidModel);

        let quota = classify_status(429, r#"{"error": {"message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#);
        assert_eq!(quota.kind, GenerationErrorKind::RateLimited);
        assert_eq!(quota.message, "Quota exceeded");
        assert_eq!(quota.status_code, Some(429));

        assert_eq!(classify_status(503, "overloaded").kind, GenerationErrorKind::Service);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let generator = GeminiGenerator::new(GeminiConfig::default()).unwrap();

        let err = generator.generate(&request(None)).await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::InvalidCredentials);

        let err = generator.generate(&request(Some(ApiKey::new(" ")))).await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::InvalidCredentials);
    }
}
