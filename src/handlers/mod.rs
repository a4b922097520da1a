//! HTTP request handlers for the riskchat API

use crate::config::{Config, ModelEndpoint};
use crate::error::AppResult;
use crate::provider::{GenerateClient, HttpGenerateClient};
use std::sync::Arc;
use std::time::Duration;

pub mod assistant;
pub mod health;

/// Application state shared across all handlers
///
/// Holds the immutable configuration, the priority-ordered endpoint list and
/// the provider client, all initialized once at startup. Fields are Arc'd for
/// cheap cloning across Axum handlers; nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    endpoints: Arc<Vec<ModelEndpoint>>,
    client: Option<Arc<dyn GenerateClient>>,
}

impl AppState {
    /// Create AppState from configuration, building the real provider client.
    ///
    /// A missing credential is not fatal here: the dashboard works without
    /// the assistant, and chat requests then fail fast in the handler.
    pub fn new(config: Config) -> AppResult<Self> {
        let client: Option<Arc<dyn GenerateClient>> = match config.provider.api_key() {
            Some(key) => Some(Arc::new(HttpGenerateClient::new(
                config.provider.base_url(),
                key,
                Duration::from_secs(config.server.request_timeout_seconds),
            )?)),
            None => {
                tracing::warn!(
                    "No provider credential configured; assistant requests will be rejected"
                );
                None
            }
        };

        let endpoints = Arc::new(config.provider.endpoints_by_priority());
        Ok(Self {
            config: Arc::new(config),
            endpoints,
            client,
        })
    }

    /// Create AppState with an injected provider client (used by tests to
    /// drive the pipeline with scripted fakes).
    pub fn with_client(config: Config, client: Arc<dyn GenerateClient>) -> Self {
        let endpoints = Arc::new(config.provider.endpoints_by_priority());
        Self {
            config: Arc::new(config),
            endpoints,
            client: Some(client),
        }
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the model endpoints in fallback order
    pub fn endpoints(&self) -> &[ModelEndpoint] {
        &self.endpoints
    }

    /// Get the provider client, if a credential was configured
    pub fn client(&self) -> Option<&Arc<dyn GenerateClient>> {
        self.client.as_ref()
    }
}
