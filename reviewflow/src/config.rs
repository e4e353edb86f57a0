//! Run configuration: model, temperature and credentials.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Environment variable selecting the model.
pub const MODEL_ENV: &str = "REVIEWFLOW_MODEL";
/// Environment variable holding the sampling temperature.
pub const TEMPERATURE_ENV: &str = "REVIEWFLOW_TEMPERATURE";

/// Supported generation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelId {
    /// Fast and cheap.
    #[default]
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    /// Deeper reasoning, slower.
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl ModelId {
    /// All supported models, default first.
    pub const ALL: [Self; 2] = [Self::Gemini25FlashLite, Self::Gemini25Pro];

    /// Wire identifier of the model.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}

/// Sampling temperature in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// Default temperature.
    pub const DEFAULT: Self = Self(0.3);

    /// Creates a validated temperature.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside `[0.0, 1.0]` or not finite.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::TemperatureOutOfRange(value))
        }
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Temperature {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Opaque API credential. Never printed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the secret for transport.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Per-run configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    /// Model used for every stage.
    #[serde(default)]
    pub model: ModelId,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Temperature,
    /// Credentials passed through to the generator.
    #[serde(default)]
    pub credentials: Option<ApiKey>,
}

impl ReviewConfig {
    /// Creates a configuration with defaults and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = model;
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: ApiKey) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Returns true if non-blank credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials.as_ref().is_some_and(|k| !k.is_blank())
    }

    /// Loads configuration from the environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or temperature variables hold invalid values.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the model or temperature variables hold invalid values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            config.model = model.parse()?;
        }

        if let Some(raw) = lookup(TEMPERATURE_ENV).filter(|v| !v.trim().is_empty()) {
            let value: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: TEMPERATURE_ENV.to_string(),
                value: raw.clone(),
            })?;
            config.temperature = Temperature::new(value)?;
        }

        config.credentials = lookup(API_KEY_ENV)
            .map(ApiKey::new)
            .filter(|k| !k.is_blank());

        Ok(config)
    }
}
