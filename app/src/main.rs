//! Dunning command-line shell.
//!
//! This is the thin application shell that parses commands and wires the
//! session state. Core logic lives in the `crates/` directory.

mod cli;
mod commands;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use commands::OutputFormat;
use dunning_core::AppConfig;
use state::AppState;
use tracing::info;

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--log-level`. Logs go to stderr so command output
/// on stdout stays machine-readable.
fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::new("info,dunning=debug"),
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load_with_env(cli.config.as_deref())
        .context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let state = AppState::new(config);
    commands::run(&state, cli.command, OutputFormat::parse(&cli.format)).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    info!("Starting Dunning v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
