// src/main.rs

//! gremlin-replicate
//!
//! Entry point for the gremlin-replicate CLI.
//!
//! Copies health checks, scenarios and external integrations from one or more
//! Gremlin teams into a destination team. All real work lives in `migrate`.
//!
//! Responsibilities of this file:
//! - Load `.env`, parse CLI arguments, initialise logging
//! - Build the source and destination API clients
//! - Hand off to the orchestrator and print the report
//!
//! Individual copy failures do not change the exit code; only setup and
//! authentication errors do.

mod api;
mod cli;
mod config;
mod error;
mod migrate;
mod model;
mod remap;
mod report;
mod run_id;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::HttpGremlinClient;
use crate::config::Settings;
use crate::migrate::Migrator;
use crate::report::MigrationReport;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &MigrationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_summary());
    }
    Ok(())
}

/// Program entry point.
///
/// Calls are awaited one at a time; Tokio is only here because reqwest is async.
#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    init_tracing();

    let settings = Settings::from_cli(cli)?;

    let source = HttpGremlinClient::new(&settings.base_url, &settings.source_api_key)
        .context("Failed to build source API client")?;
    let dest = HttpGremlinClient::new(&settings.base_url, &settings.dest_api_key)
        .context("Failed to build destination API client")?;

    let migrator = Migrator::new(source, dest);
    let report = match migrator.run(&settings.plan).await {
        Ok(report) => report,
        Err(aborted) => {
            // Still show what was copied or deleted before the run stopped
            print_report(&aborted.partial, settings.json)?;
            return Err(aborted.error.into());
        }
    };

    print_report(&report, settings.json)?;

    tracing::info!(
        failures = report.total_failures(),
        "finished replicating health checks, scenarios, and integrations"
    );

    Ok(())
}
