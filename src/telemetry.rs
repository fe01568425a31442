//! Logging setup and shutdown signals
//!
//! Logs go to stderr; stdout is reserved for the progress markers.

use crate::error::{ConfigError, ConfigResult};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Map a log level name to a tracing filter directive.
///
/// Accepts tracing's names and the Python-style ones (`WARNING`, `CRITICAL`),
/// case-insensitively.
pub fn level_directive(level: &str) -> ConfigResult<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" | "critical" | "fatal" => Ok("error"),
        "off" => Ok("off"),
        other => Err(ConfigError::Invalid(format!("unknown log level '{}'", other))),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) -> ConfigResult<()> {
    let directive = level_directive(level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| ConfigError::Invalid(format!("cannot install logger: {}", e)))
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!("shutdown signal received");
}
