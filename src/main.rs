//! pgstorm - Load testing for PostgreSQL
//!
//! This is the main entry point for the pgstorm binary.
//! The actual logic is in the library modules for better testability.

use anyhow::{Context, Result};
use clap::Parser;
use pgstorm::cli::Args;
use pgstorm::config::load_settings;
use pgstorm::db::PostgresConnector;
use pgstorm::pool::WorkerPool;
use pgstorm::reporter::ConsoleReporter;
use pgstorm::telemetry::{init_tracing, shutdown_signal};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref()).context("loading settings")?;
    let run = args.resolve(&settings)?;
    init_tracing(&run.log_level)?;

    let query = args.read_query()?;
    let spec = args.test_spec(query)?;

    info!(tls = spec.dsn().uses_tls(), "pgstorm starting against {}", spec.dsn());
    info!(
        "run config: {}",
        serde_json::to_string(&run).unwrap_or_else(|_| "{}".to_string())
    );
    info!(
        "expectation: {}",
        serde_json::to_string(spec.expectation()).unwrap_or_else(|_| "{}".to_string())
    );

    let reporter = Arc::new(ConsoleReporter::stdout(run.markers));
    let pool = WorkerPool::new(
        run.pool,
        Arc::new(spec),
        Arc::new(PostgresConnector::new()),
        Arc::clone(&reporter),
    )?;

    tokio::select! {
        _ = pool.run() => {}
        _ = shutdown_signal() => {}
    }

    eprintln!();
    eprintln!("{}", reporter.tally());
    Ok(())
}
