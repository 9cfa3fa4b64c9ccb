//! Codepage Hub: manage, validate and version codepages stored in a remote
//! record store.
//!
//! Entry point that loads configuration, initializes logging and dispatches
//! the command line.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use codepage_cli::Cli;
use codepage_cli::output;
use codepage_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::debug!(config = %cli.config, env = %cli.env, "Configuration loaded");

    if let Err(e) = cli.execute(&config).await {
        tracing::debug!(kind = %e.kind, status = ?e.status, "Command failed");
        output::print_error(&e.to_string());
        eprintln!("  {}", e.user_hint());
        std::process::exit(1);
    }
}

/// Initialize tracing/logging on stderr.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
