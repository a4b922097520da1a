//! Integration tests for the model fallback executor
//!
//! Drives the executor with a scripted provider fake to pin down the
//! classification-driven fallback rules:
//! - 404 advances to the next endpoint, carrying the message forward
//! - 429 stops immediately without trying siblings
//! - any other error stops immediately
//! - exhaustion degrades to a generic failure with the last 404 message

use async_trait::async_trait;
use riskchat::assistant::{fallback, GeneratedRequest, ProviderOutcome, SamplingConfig, Turn};
use riskchat::config::ModelEndpoint;
use riskchat::provider::{GenerateClient, ProviderCallError};
use std::collections::HashMap;
use std::sync::Mutex;

/// What the fake provider should answer for one model name
enum Script {
    Text(&'static str),
    Status(u16, &'static str),
    Transport(&'static str),
}

/// Provider fake that answers per-model scripts and records call order
struct ScriptedClient {
    script: HashMap<&'static str, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(entries: Vec<(&'static str, Script)>) -> Self {
        Self {
            script: entries.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerateClient for ScriptedClient {
    async fn generate(
        &self,
        model: &str,
        _request: &GeneratedRequest,
    ) -> Result<String, ProviderCallError> {
        self.calls.lock().unwrap().push(model.to_string());
        match self.script.get(model) {
            Some(Script::Text(text)) => Ok(text.to_string()),
            Some(Script::Status(code, message)) => Err(ProviderCallError::Status {
                code: *code,
                message: message.to_string(),
            }),
            Some(Script::Transport(message)) => {
                Err(ProviderCallError::Transport(message.to_string()))
            }
            None => Err(ProviderCallError::Status {
                code: 404,
                message: format!("model {model} is not scripted"),
            }),
        }
    }
}

fn endpoint(name: &str) -> ModelEndpoint {
    toml::from_str(&format!("name = \"{name}\"")).expect("should build endpoint")
}

fn request() -> GeneratedRequest {
    GeneratedRequest {
        turns: vec![Turn::user("instructions"), Turn::assistant("ack")],
        sampling: SamplingConfig {
            temperature: 0.4,
            max_output_tokens: 1024,
        },
    }
}

#[tokio::test]
async fn first_success_short_circuits() {
    let client = ScriptedClient::new(vec![("model-a", Script::Text("answer"))]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    assert_eq!(report.outcome, ProviderOutcome::Success("answer".to_string()));
    assert_eq!(report.attempted, vec!["model-a"]);
    assert_eq!(client.calls(), vec!["model-a"]);
}

#[tokio::test]
async fn not_found_falls_back_to_next_endpoint() {
    let client = ScriptedClient::new(vec![
        ("model-a", Script::Status(404, "model retired")),
        ("model-b", Script::Text("answer from b")),
    ]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    assert_eq!(
        report.outcome,
        ProviderOutcome::Success("answer from b".to_string())
    );
    assert_eq!(report.attempted, vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn rate_limit_stops_without_trying_siblings() {
    let client = ScriptedClient::new(vec![
        ("model-a", Script::Status(429, "quota exhausted")),
        ("model-b", Script::Text("never reached")),
    ]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    assert_eq!(report.outcome, ProviderOutcome::RateLimited);
    assert_eq!(report.attempted, vec!["model-a"]);
    assert_eq!(client.calls(), vec!["model-a"]);
}

#[tokio::test]
async fn other_provider_error_stops_immediately() {
    let client = ScriptedClient::new(vec![
        ("model-a", Script::Status(500, "internal provider error")),
        ("model-b", Script::Text("never reached")),
    ]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    match report.outcome {
        ProviderOutcome::OtherError(message) => {
            assert!(message.contains("internal provider error"));
        }
        other => panic!("expected OtherError, got {other:?}"),
    }
    assert_eq!(report.attempted, vec!["model-a"]);
}

#[tokio::test]
async fn transport_failure_stops_immediately() {
    let client = ScriptedClient::new(vec![
        ("model-a", Script::Transport("connection refused")),
        ("model-b", Script::Text("never reached")),
    ]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    match report.outcome {
        ProviderOutcome::OtherError(message) => assert!(message.contains("connection refused")),
        other => panic!("expected OtherError, got {other:?}"),
    }
    assert_eq!(client.calls(), vec!["model-a"]);
}

#[tokio::test]
async fn exhaustion_carries_last_seen_error() {
    let client = ScriptedClient::new(vec![
        ("model-a", Script::Status(404, "a is gone")),
        ("model-b", Script::Status(404, "b is gone")),
    ]);
    let endpoints = vec![endpoint("model-a"), endpoint("model-b")];

    let report = fallback::execute(&client, &endpoints, &request()).await;

    assert_eq!(
        report.outcome,
        ProviderOutcome::OtherError("b is gone".to_string())
    );
    assert_eq!(report.attempted, vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn empty_endpoint_list_is_a_generic_failure() {
    let client = ScriptedClient::new(vec![]);

    let report = fallback::execute(&client, &[], &request()).await;

    match report.outcome {
        ProviderOutcome::OtherError(message) => {
            assert!(message.contains("no model endpoints"));
        }
        other => panic!("expected OtherError, got {other:?}"),
    }
    assert!(report.attempted.is_empty());
}
