//! mint-ops
//!
//! Builds, signs and submits transactions for the key and gen2 collection
//! programs, then waits for each to commit.
//!
//! # Architecture Overview
//!
//! ```text
//!   operator ──▶ cli ──▶ commands ──▶ operations (payload builders)
//!                           │
//!                           ▼
//!                      batch::BatchLoop ──▶ ledger::TransactionSubmitter
//!                           │                   │ build, sign, submit, poll
//!                           ▼                   ▼
//!                  report (stdout)        ledger::RestClient ──▶ node REST API
//!
//!   config (TOML + env) and observability (tracing, metrics) are shared.
//! ```

use clap::Parser;
use std::process::ExitCode;

use mint_ops::cli::Cli;
use mint_ops::commands;
use mint_ops::config::load_config;
use mint_ops::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.node_url.as_deref())?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        node_url = %config.ledger.node_url,
        identity = %cli.identity,
        poll_timeout_secs = config.polling.timeout_secs,
        "Configuration loaded"
    );

    if let Some(address) = &config.observability.metrics_address {
        match address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %address,
                "Failed to parse metrics address"
            ),
        }
    }

    if commands::run(cli, config).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
