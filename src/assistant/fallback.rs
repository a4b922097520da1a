//! Model fallback executor
//!
//! Submits one assembled request against the prioritized endpoint list, one
//! endpoint at a time, and classifies each raw provider result. Only a 404
//! ("model not found or retired") advances the cursor to the next endpoint;
//! quota and protocol errors are treated as endpoint-independent and stop the
//! loop immediately. No backoff, no delays, no state carried across requests.

use crate::config::ModelEndpoint;
use crate::provider::{GenerateClient, ProviderCallError};

use super::GeneratedRequest;

/// Classified result of one provider attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// Text was extracted from the response
    Success(String),
    /// Provider reported code 429; the quota applies across endpoints
    RateLimited,
    /// Provider reported code 404; the next endpoint may still work
    NotFound(String),
    /// Any other error shape, or a success body with no extractable text
    OtherError(String),
}

/// Final outcome of a fallback run plus the endpoints tried, for diagnostics
#[derive(Debug, Clone)]
pub struct FallbackReport {
    pub outcome: ProviderOutcome,
    pub attempted: Vec<String>,
}

/// Run the fallback loop over `endpoints` in order.
///
/// Returns the first terminal outcome. When every endpoint answered 404, the
/// run degrades to `OtherError` carrying the last 404 message rather than a
/// silent empty success.
pub async fn execute(
    client: &dyn GenerateClient,
    endpoints: &[ModelEndpoint],
    request: &GeneratedRequest,
) -> FallbackReport {
    let mut attempted = Vec::with_capacity(endpoints.len());
    let mut last_missing: Option<String> = None;

    for endpoint in endpoints {
        attempted.push(endpoint.name().to_string());
        tracing::debug!(
            model = %endpoint.name(),
            turns = request.turns.len(),
            "Attempting generation"
        );

        match classify(client.generate(endpoint.name(), request).await) {
            ProviderOutcome::Success(text) => {
                tracing::info!(
                    model = %endpoint.name(),
                    response_length = text.len(),
                    attempts = attempted.len(),
                    "Generation succeeded"
                );
                return FallbackReport {
                    outcome: ProviderOutcome::Success(text),
                    attempted,
                };
            }
            ProviderOutcome::RateLimited => {
                tracing::warn!(
                    model = %endpoint.name(),
                    "Provider quota exceeded; not trying sibling endpoints"
                );
                return FallbackReport {
                    outcome: ProviderOutcome::RateLimited,
                    attempted,
                };
            }
            ProviderOutcome::NotFound(message) => {
                tracing::warn!(
                    model = %endpoint.name(),
                    error = %message,
                    "Model endpoint unavailable, falling back to next"
                );
                last_missing = Some(message);
            }
            ProviderOutcome::OtherError(message) => {
                tracing::error!(
                    model = %endpoint.name(),
                    error = %message,
                    "Generation failed with non-retryable error"
                );
                return FallbackReport {
                    outcome: ProviderOutcome::OtherError(message),
                    attempted,
                };
            }
        }
    }

    let message = last_missing
        .unwrap_or_else(|| "no model endpoints configured".to_string());
    tracing::error!(
        attempts = attempted.len(),
        error = %message,
        "All model endpoints exhausted"
    );
    FallbackReport {
        outcome: ProviderOutcome::OtherError(message),
        attempted,
    }
}

/// Map one raw provider result onto the outcome taxonomy.
fn classify(result: Result<String, ProviderCallError>) -> ProviderOutcome {
    match result {
        Ok(text) => ProviderOutcome::Success(text),
        Err(ProviderCallError::Status { code: 429, .. }) => ProviderOutcome::RateLimited,
        Err(ProviderCallError::Status { code: 404, message }) => {
            ProviderOutcome::NotFound(message)
        }
        Err(other) => ProviderOutcome::OtherError(other.to_string()),
    }
}
