//! Riskchat HTTP server
//!
//! Starts an Axum web server exposing the assistant chat endpoint and a
//! health check.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use clap::Parser;
use riskchat::{
    cli::{Cli, Command},
    config::Config,
    handlers::{self, AppState},
    middleware::request_id_middleware,
    telemetry,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = riskchat::cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(path, template)?;
                println!("Wrote config template to {path}");
            }
            None => print!("{template}"),
        }
        return Ok(());
    }

    let config = Config::from_file(&cli.config)?;

    telemetry::init(&config.observability.log_level);

    tracing::info!(
        "Starting riskchat server on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!(
        models = ?config
            .provider
            .endpoints_by_priority()
            .iter()
            .map(|e| e.name().to_string())
            .collect::<Vec<_>>(),
        "Model fallback order"
    );

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/health", get(handlers::health::handler))
        .route("/assistant/chat", post(handlers::assistant::handler))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from((
        host.parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        port,
    ));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
