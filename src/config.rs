//! Configuration management for riskchat
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Everything here is read once at process start and never mutated afterwards;
//! in particular the ordered model endpoint list and the provider credential
//! are fixed for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Environment variable consulted when `provider.api_key` is absent from the
/// config file.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// LLM provider configuration
///
/// Fields are private to enforce invariants. Configuration is loaded via
/// deserialization and validated via `Config::validate()`. After construction,
/// fields cannot be mutated, ensuring validated data remains valid.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Provider credential. Falls back to the `GEMINI_API_KEY` environment
    /// variable when omitted. May legitimately be absent: the dashboard runs
    /// without the assistant, and chat requests then fail fast.
    #[serde(default)]
    api_key: Option<String>,
    /// Ordered fallback list of model endpoints
    models: Vec<ModelEndpoint>,
}

impl ProviderConfig {
    /// Get the provider API base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the provider credential, if one was configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Get the configured model endpoints in file order
    pub fn models(&self) -> &[ModelEndpoint] {
        &self.models
    }

    /// Model endpoints ordered for fallback: higher priority first, ties kept
    /// in file order (stable sort).
    pub fn endpoints_by_priority(&self) -> Vec<ModelEndpoint> {
        let mut ordered = self.models.clone();
        ordered.sort_by_key(|endpoint| std::cmp::Reverse(endpoint.priority()));
        ordered
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// One named model endpoint offered by the provider
///
/// Endpoints differ in capability and availability, not in conversation
/// format, so a single request shape is submitted to whichever one is tried.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelEndpoint {
    name: String,
    /// Fallback priority - higher priority endpoints are tried first
    #[serde(default = "default_priority")]
    priority: u8,
}

impl ModelEndpoint {
    /// Get the provider-side model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the fallback priority (higher = tried first)
    pub fn priority(&self) -> u8 {
        self.priority
    }
}

fn default_priority() -> u8 {
    1
}

/// Sampling parameters applied to every generation request
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_temperature() -> f64 {
    0.4
}

fn default_max_output_tokens() -> u32 {
    1024
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Resolves the provider credential from the `GEMINI_API_KEY` environment
    /// variable when the file does not carry one.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let mut config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 3: Environment fallback for the credential
        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        // Phase 4: Validate parsed config (provides contextual reason)
        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// This is called automatically by `from_file()`, but can also be called
    /// explicitly when constructing Config via other means (e.g., in tests).
    pub fn validate(&self) -> crate::error::AppResult<()> {
        // At least one model endpoint must exist, otherwise every chat request
        // would fail with nothing attempted.
        if self.provider.models.is_empty() {
            return Err(crate::error::AppError::Config(
                "provider.models has no entries. Add at least one, e.g.\n\
                [[provider.models]]\n\
                name = \"gemini-2.0-flash\"\n\
                priority = 2"
                    .to_string(),
            ));
        }

        for endpoint in &self.provider.models {
            if endpoint.name.trim().is_empty() {
                return Err(crate::error::AppError::Config(
                    "provider.models contains an entry with a blank name".to_string(),
                ));
            }
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(crate::error::AppError::Config(format!(
                "provider.base_url '{}' must start with 'http://' or 'https://'",
                self.provider.base_url
            )));
        }
        if self.provider.base_url.ends_with('/') {
            return Err(crate::error::AppError::Config(format!(
                "provider.base_url '{}' must not end with '/'; model paths are appended to it",
                self.provider.base_url
            )));
        }

        if let Some(key) = &self.provider.api_key {
            if key.trim().is_empty() {
                return Err(crate::error::AppError::Config(
                    "provider.api_key is present but blank; remove it or set a real key"
                        .to_string(),
                ));
            }
        }

        if self.generation.temperature < 0.0
            || self.generation.temperature > 2.0
            || self.generation.temperature.is_nan()
            || self.generation.temperature.is_infinite()
        {
            return Err(crate::error::AppError::Config(format!(
                "generation.temperature must be a finite number between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.max_output_tokens == 0 {
            return Err(crate::error::AppError::Config(
                "generation.max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "server.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.server.request_timeout_seconds > 300 {
            return Err(crate::error::AppError::Config(format!(
                "server.request_timeout_seconds cannot exceed 300 seconds (5 minutes), got {}",
                self.server.request_timeout_seconds
            )));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    /// Parse and validate a config from a TOML string.
    ///
    /// Unlike `from_file`, no environment fallback is applied, so tests are
    /// not affected by the ambient `GEMINI_API_KEY`.
    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}
