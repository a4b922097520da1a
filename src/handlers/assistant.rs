//! Assistant chat endpoint handler
//!
//! Handles POST /assistant/chat: accepts the full client-held conversation
//! plus the current top-risk snapshot, runs the assistant pipeline, and maps
//! the outcome onto the caller-facing result shape.

use crate::assistant::{self, ClientMessage, ProviderOutcome, RiskItem};
use crate::error::AppError;
use crate::middleware::RequestId;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Deserializer, Serialize};

use super::AppState;

/// Maximum number of history messages accepted per request
const MAX_MESSAGES: usize = 100;
/// Maximum total content length across all messages (200K chars)
const MAX_TOTAL_CONTENT_LENGTH: usize = 200_000;

/// Chat request from the dashboard UI
///
/// The client holds the whole conversation and replays it on every call;
/// there is no server-side session. Validation is enforced during
/// deserialization - oversized histories cannot exist past this point.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantChatRequest {
    messages: Vec<ClientMessage>,
    risk_items: Vec<RiskItem>,
}

impl AssistantChatRequest {
    /// Get the raw conversation history
    pub fn messages(&self) -> &[ClientMessage] {
        &self.messages
    }

    /// Get the risk-item snapshot
    pub fn risk_items(&self) -> &[RiskItem] {
        &self.risk_items
    }
}

impl<'de> Deserialize<'de> for AssistantChatRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawRequest {
            #[serde(default)]
            messages: Vec<ClientMessage>,
            #[serde(default)]
            risk_items: Vec<RiskItem>,
        }

        let raw = RawRequest::deserialize(deserializer)?;

        if raw.messages.len() > MAX_MESSAGES {
            return Err(serde::de::Error::custom(format!(
                "messages array cannot exceed {} entries (got {})",
                MAX_MESSAGES,
                raw.messages.len()
            )));
        }

        let total_length: usize = raw
            .messages
            .iter()
            .map(|m| m.content.chars().count())
            .sum();
        if total_length > MAX_TOTAL_CONTENT_LENGTH {
            return Err(serde::de::Error::custom(format!(
                "total message content exceeds {} characters (got {})",
                MAX_TOTAL_CONTENT_LENGTH, total_length
            )));
        }

        Ok(AssistantChatRequest {
            messages: raw.messages,
            risk_items: raw.risk_items,
        })
    }
}

/// Successful assistant reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
}

/// POST /assistant/chat handler
///
/// Fails fast with a configuration error when no provider credential is
/// available, before any endpoint attempt. Otherwise the fallback report's
/// outcome is mapped totally: success to 200, quota to 429, everything else
/// to a generic 502 carrying a short diagnostic.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AssistantChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(
        request_id = %request_id,
        history_len = request.messages().len(),
        risk_items = request.risk_items().len(),
        "Received assistant chat request"
    );

    let client = state.client().ok_or_else(|| {
        AppError::Config(
            "provider credential is not configured; set provider.api_key or GEMINI_API_KEY"
                .to_string(),
        )
    })?;

    let report = assistant::respond(
        client.as_ref(),
        state.endpoints(),
        &state.config().generation,
        request.messages(),
        request.risk_items(),
    )
    .await;

    tracing::info!(
        request_id = %request_id,
        attempted = ?report.attempted,
        "Assistant pipeline finished"
    );

    match report.outcome {
        ProviderOutcome::Success(text) => Ok(Json(AssistantReply { text })),
        ProviderOutcome::RateLimited => Err(AppError::ProviderQuota),
        ProviderOutcome::OtherError(message) => Err(AppError::Generation(message)),
        // NotFound is consumed inside the executor; mapped here only so the
        // match stays total over the outcome union.
        ProviderOutcome::NotFound(message) => Err(AppError::Generation(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Role;

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{}"#;
        let req: AssistantChatRequest = serde_json::from_str(json).expect("should deserialize");
        assert!(req.messages().is_empty());
        assert!(req.risk_items().is_empty());
    }

    #[test]
    fn test_request_deserializes_history_and_items() {
        let json = r#"{
            "messages": [
                {"role": "assistant", "content": "Welcome!"},
                {"role": "user", "content": "What is SINGLE_BIDDER?"}
            ],
            "risk_items": [
                {"lot_id": 1, "lot_name": "Lot", "risk_score": 80.0, "risk_level": "HIGH",
                 "customer_bin": "1", "amount": 10.0, "top_reasons": []}
            ]
        }"#;
        let req: AssistantChatRequest = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(req.messages().len(), 2);
        assert_eq!(req.messages()[1].role, Role::User);
        assert_eq!(req.risk_items().len(), 1);
    }

    #[test]
    fn test_request_rejects_too_many_messages() {
        let messages: Vec<String> = (0..101)
            .map(|i| format!(r#"{{"role": "user", "content": "m{i}"}}"#))
            .collect();
        let json = format!(r#"{{"messages": [{}]}}"#, messages.join(","));
        let result = serde_json::from_str::<AssistantChatRequest>(&json);
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("cannot exceed"), "got: {err_msg}");
    }

    #[test]
    fn test_request_rejects_oversized_content() {
        let big = "a".repeat(200_001);
        let json = format!(r#"{{"messages": [{{"role": "user", "content": "{big}"}}]}}"#);
        let result = serde_json::from_str::<AssistantChatRequest>(&json);
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("exceeds"), "got: {err_msg}");
    }

    #[test]
    fn test_request_counts_characters_not_bytes() {
        // 100_000 three-byte CJK chars stay under the 200K character cap
        let cjk = "你".repeat(100_000);
        let json = format!(r#"{{"messages": [{{"role": "user", "content": "{cjk}"}}]}}"#);
        let result = serde_json::from_str::<AssistantChatRequest>(&json);
        assert!(result.is_ok(), "error: {:?}", result.err());
    }

    #[test]
    fn test_reply_serializes() {
        let reply = AssistantReply {
            text: "SINGLE_BIDDER means the lot got one bid.".to_string(),
        };
        let json = serde_json::to_string(&reply).expect("should serialize");
        assert!(json.contains("\"text\""));
    }
}
