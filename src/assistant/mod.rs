//! Assistant pipeline
//!
//! One request-scoped flow with no shared mutable state: grounding context is
//! built from the risk snapshot, the client history is normalized into an
//! alternating turn sequence, and the result is submitted through the model
//! fallback executor. Context building and normalization are pure; only the
//! executor touches the network.

pub mod context;
pub mod conversation;
pub mod fallback;

use crate::config::{GenerationConfig, ModelEndpoint};
use crate::provider::GenerateClient;

pub use context::{build_grounding_context, RiskItem, RiskLevel, NO_DATA_SENTENCE};
pub use conversation::{build_turns, ClientMessage, Role, Turn};
pub use fallback::{FallbackReport, ProviderOutcome};

/// Sampling parameters forwarded to the provider with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl From<&GenerationConfig> for SamplingConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// One fully assembled generation request
///
/// Immutable once built; a fresh instance is assembled for every incoming
/// call and nothing outlives the request.
#[derive(Debug, Clone)]
pub struct GeneratedRequest {
    pub turns: Vec<Turn>,
    pub sampling: SamplingConfig,
}

/// Run the whole pipeline for one chat request.
///
/// Never fails by itself; every failure mode is folded into the returned
/// report's outcome so the caller owns the final mapping.
pub async fn respond(
    client: &dyn GenerateClient,
    endpoints: &[ModelEndpoint],
    generation: &GenerationConfig,
    history: &[ClientMessage],
    risk_items: &[RiskItem],
) -> FallbackReport {
    let grounding = build_grounding_context(risk_items);
    let request = GeneratedRequest {
        turns: build_turns(history, &grounding),
        sampling: SamplingConfig::from(generation),
    };
    fallback::execute(client, endpoints, &request).await
}
