//! Structured logging setup
//!
//! Wires tracing-subscriber with an env-filter so operators can override the
//! configured level via RUST_LOG.

use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once per process; only the first call installs the
/// subscriber. `RUST_LOG` takes precedence over the configured default level.
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("riskchat={default_level},tower_http=info"))
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
