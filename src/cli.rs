//! Command-line interface
//!
//! Parses arguments, merges them over the settings file and reads the query
//! text. Everything here runs once, before the pool starts.

use crate::config::settings::{Settings, seconds};
use crate::config::Dsn;
use crate::error::{ConfigError, ConfigResult};
use crate::pool::PoolConfig;
use crate::reporter::Markers;
use crate::test_spec::{TestSpec, TestType};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// PostgreSQL load testing.
#[derive(Parser, Debug)]
#[command(name = "pgstorm", version, about)]
pub struct Args {
    /// pg connection string (e.g. postgresql://localhost:5432/postgres)
    #[arg(value_name = "DSN")]
    pub dsn: String,

    /// Amount of workers to start
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// SQL file to run (stdin when absent or "-")
    #[arg(short = 's', long = "sql", value_name = "FILE")]
    pub sql: Option<PathBuf>,

    /// Worker health check delay in seconds
    #[arg(short = 'd', long = "delay", value_name = "SECS")]
    pub delay: Option<f64>,

    /// Log level (trace, debug, info, warning, error)
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Test type: M - must have results, N - must return --value rows,
    /// E - first value equal to --value
    #[arg(
        short = 'y',
        long = "type",
        value_enum,
        ignore_case = true,
        default_value = "M"
    )]
    pub test_type: TestType,

    /// Value compared by the test type
    #[arg(short = 'v', long = "value")]
    pub value: Option<String>,

    /// Abandon a session after this many seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Print a marker for sessions that fail before validation
    #[arg(long = "show-errors")]
    pub show_errors: bool,

    /// Settings file (default: ~/.pgstorm/config.toml)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Settings after merging the command line over the settings file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    pub pool: PoolConfig,
    pub markers: Markers,
    pub log_level: String,
}

impl Args {
    /// Merge over `settings`; command-line values win.
    pub fn resolve(&self, settings: &Settings) -> ConfigResult<RunConfig> {
        let workers = self.threads.unwrap_or(settings.workers);
        let poll_delay = seconds("delay", self.delay.unwrap_or(settings.poll_delay))?;
        let session_timeout = self
            .timeout
            .or(settings.session_timeout)
            .map(|s| seconds("timeout", s))
            .transpose()?;
        let pool = PoolConfig::new(workers, poll_delay)?.with_session_timeout(session_timeout)?;

        let show_errors = self.show_errors || settings.show_errors;
        let markers = Markers {
            pass: settings.pass_marker,
            fail: settings.fail_marker,
            error: show_errors.then_some(settings.error_marker),
        };

        Ok(RunConfig {
            pool,
            markers,
            log_level: self
                .log_level
                .clone()
                .unwrap_or_else(|| settings.log_level.clone()),
        })
    }

    /// Read the query from `--sql`, or stdin
    pub fn read_query(&self) -> ConfigResult<String> {
        match &self.sql {
            Some(path) if path.as_os_str() != "-" => {
                std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
            _ => {
                let mut query = String::new();
                std::io::stdin()
                    .read_to_string(&mut query)
                    .map_err(|source| ConfigError::Read {
                        path: "<stdin>".to_string(),
                        source,
                    })?;
                Ok(query)
            }
        }
    }

    /// Build the shared test spec from the arguments and the query text
    pub fn test_spec(&self, query: String) -> ConfigResult<TestSpec> {
        let dsn = Dsn::parse(&self.dsn)?;
        TestSpec::new(query, dsn, self.test_type, self.value.as_deref())
    }
}
