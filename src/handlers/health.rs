//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// "configured" when a provider credential is present, otherwise "disabled"
    pub assistant: &'static str,
    /// Number of model endpoints in the fallback list
    pub model_endpoints: usize,
}

/// Health check handler
///
/// Always returns 200; the body tells monitors whether the assistant is
/// usable (credential present) and how many fallback endpoints are loaded.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let assistant = if state.client().is_some() {
        "configured"
    } else {
        "disabled"
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            assistant,
            model_endpoints: state.endpoints().len(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::str::FromStr;

    fn create_test_state(with_key: bool) -> AppState {
        let key_line = if with_key { "api_key = \"test-key\"" } else { "" };
        let toml = format!(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[provider]
{key_line}

[[provider.models]]
name = "gemini-2.0-flash"
"#
        );
        let config = Config::from_str(&toml).expect("should parse test config");
        AppState::new(config).expect("should create AppState")
    }

    #[tokio::test]
    async fn test_health_handler_returns_ok() {
        let state = create_test_state(true);
        let (status, Json(body)) = handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "OK");
        assert_eq!(body.assistant, "configured");
        assert_eq!(body.model_endpoints, 1);
    }

    #[tokio::test]
    async fn test_health_handler_reports_disabled_assistant() {
        let state = create_test_state(false);
        let (status, Json(body)) = handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.assistant, "disabled");
    }
}
