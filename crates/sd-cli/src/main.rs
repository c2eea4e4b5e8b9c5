//! # stratdash
//!
//! Command-line front end for strategy dashboard datasets.
//!
//! ```bash
//! stratdash -D stratdash.json progress --as-of 2024-06-30
//! stratdash forecast --kpi 3 --periods 12
//! stratdash check --user 5 --module KPI --action EDIT
//! stratdash report --user 5 > dashboard.json
//! ```

mod cli;
mod commands;
mod dataset;

use clap::Parser;
use sd_core::config::{AppConfig, LogFormat, LoggingConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        "Starting stratdash"
    );

    commands::run(cli, config).await
}

/// Logs go to stderr so command output stays machine readable
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());

    match logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
