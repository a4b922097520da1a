//! LLM provider transport
//!
//! Speaks the provider's `generateContent` wire format: alternating
//! `user`/`model` contents with text parts, a `generationConfig` block, and
//! errors delivered as an `{"error": {code, message}}` envelope. The
//! `GenerateClient` trait is the only I/O seam of the pipeline, so the
//! fallback executor can be driven by scripted fakes in tests.

use crate::assistant::{GeneratedRequest, Role};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Raw failure of one provider call, before classification
#[derive(Error, Debug)]
pub enum ProviderCallError {
    /// Provider answered with a structured error envelope
    #[error("provider returned code {code}: {message}")]
    Status { code: u16, message: String },

    /// The request never produced a readable HTTP response
    #[error("transport failure: {0}")]
    Transport(String),

    /// A success response arrived but no text could be extracted from it
    #[error("unreadable provider response: {0}")]
    Decode(String),
}

/// One generation call against a named model endpoint
#[async_trait]
pub trait GenerateClient: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        request: &GeneratedRequest,
    ) -> Result<String, ProviderCallError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WirePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct WireGenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

impl WireRequest {
    fn from_request(request: &GeneratedRequest) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| WireContent {
                // The provider names the assistant role "model"
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                },
                parts: vec![WirePart {
                    text: turn.text.clone(),
                }],
            })
            .collect();
        Self {
            contents,
            generation_config: WireGenerationConfig {
                temperature: request.sampling.temperature,
                max_output_tokens: request.sampling.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct WireCandidateContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Concatenated text of the first candidate, or a decode error when the body
/// carries none.
fn extract_text(body: &str) -> Result<String, ProviderCallError> {
    let parsed: WireResponse = serde_json::from_str(body)
        .map_err(|e| ProviderCallError::Decode(format!("malformed response body: {e}")))?;

    let text = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderCallError::Decode(
            "response carried no candidate text".to_string(),
        ));
    }
    Ok(text)
}

// ============================================================================
// HTTP client
// ============================================================================

/// reqwest-backed `GenerateClient`
///
/// The credential travels in a request header, never in the URL, so transport
/// error strings (which may embed the URL) cannot leak it.
pub struct HttpGenerateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpGenerateClient {
    /// Build a client with a per-attempt timeout.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl GenerateClient for HttpGenerateClient {
    async fn generate(
        &self,
        model: &str,
        request: &GeneratedRequest,
    ) -> Result<String, ProviderCallError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = WireRequest::from_request(request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderCallError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderCallError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Prefer the numeric code inside the error envelope; fall back to
            // the HTTP status when the body is not the expected shape.
            return match serde_json::from_str::<WireErrorEnvelope>(&text) {
                Ok(envelope) => Err(ProviderCallError::Status {
                    code: envelope.error.code.unwrap_or_else(|| status.as_u16()),
                    message: envelope
                        .error
                        .message
                        .unwrap_or_else(|| format!("HTTP {status}")),
                }),
                Err(_) => Err(ProviderCallError::Status {
                    code: status.as_u16(),
                    message: format!("HTTP {status}"),
                }),
            };
        }

        extract_text(&text)
    }
}
