//! Command-line interface for riskchat
//!
//! Provides argument parsing and subcommand handling for the riskchat binary.

use clap::{Parser, Subcommand};

/// Grounded LLM assistant orchestrator for procurement risk dashboards
#[derive(Parser)]
#[command(name = "riskchat")]
#[command(version)]
#[command(about = "Grounded LLM assistant orchestrator for procurement risk dashboards")]
#[command(
    long_about = "Riskchat assembles grounded generation requests from dashboard chat \
    histories and top-risk lot snapshots, and submits them against a prioritized list \
    of provider model endpoints with fallback on endpoint unavailability."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Riskchat Configuration
# ======================
#
# This file configures the HTTP server, the LLM provider with its ordered
# model fallback list, generation sampling, and logging.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 8080

# Per-attempt timeout for provider calls, in seconds
request_timeout_seconds = 30

[provider]
# Provider API base (no trailing slash); model paths are appended to it
base_url = "https://generativelanguage.googleapis.com/v1beta"

# Credential. Prefer leaving this out and exporting GEMINI_API_KEY instead.
# api_key = "..."

# Ordered fallback list: higher priority is tried first. A model answering
# 404 (retired or renamed) falls through to the next entry; other provider
# errors stop the attempt chain immediately.
[[provider.models]]
name = "gemini-2.0-flash"
priority = 3

[[provider.models]]
name = "gemini-1.5-flash"
priority = 2

[[provider.models]]
name = "gemini-1.5-flash-8b"
priority = 1

[generation]
# Sampling temperature (0.0-2.0). Low values keep answers anchored to the data.
temperature = 0.4

# Cap on generated tokens per reply
max_output_tokens = 1024

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Clap's built-in verification for the CLI structure
        Cli::command().debug_assert();
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::parse_from(["riskchat"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_config_path() {
        let cli = Cli::parse_from(["riskchat", "--config", "custom.toml"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn config_subcommand() {
        let cli = Cli::parse_from(["riskchat", "config"]);
        assert!(matches!(cli.command, Some(Command::Config { output: None })));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["riskchat", "config", "-o", "my-config.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == "my-config.toml"
        ));
    }

    #[test]
    fn template_is_valid_toml() {
        let template = generate_config_template();
        let result: Result<toml::Value, _> = toml::from_str(template);
        assert!(
            result.is_ok(),
            "Template should be valid TOML: {:?}",
            result.err()
        );
    }

    #[test]
    fn template_parses_as_config() {
        use crate::config::Config;
        use std::str::FromStr;
        let config = Config::from_str(generate_config_template())
            .expect("template should be a valid, complete config");
        assert_eq!(config.provider.models().len(), 3);
    }
}
