//! pgstorm - Load testing for PostgreSQL
//!
//! pgstorm keeps a fixed number of workers busy opening short-lived
//! connections, running one query, and checking the rows against an
//! expectation. Each finished session prints one symbol (`.` pass, `E` fail)
//! so the stream shows the pass/fail density live while the server is under
//! load.
//!
//! # Architecture
//!
//! - [`validator`]: Pure pass/fail decision over a result set
//! - [`session`]: One connect, query, commit, close, validate cycle
//! - [`pool`]: Fixed slot array that relaunches finished sessions forever
//! - [`reporter`]: Serialized, flushed progress markers
//! - [`db`]: Database capability traits and the tokio-postgres connector
//! - [`config`]: DSN parsing and the settings file
//! - [`cli`]: Argument parsing and query loading
//! - [`error`]: Error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pgstorm::config::Dsn;
//! use pgstorm::db::PostgresConnector;
//! use pgstorm::pool::{PoolConfig, WorkerPool};
//! use pgstorm::reporter::{ConsoleReporter, Markers};
//! use pgstorm::test_spec::{TestSpec, TestType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dsn = Dsn::parse("postgresql://postgres@localhost:5432/postgres")?;
//! let spec = TestSpec::new("SELECT 1", dsn, TestType::RowCountEquals, Some("1"))?;
//! let config = PoolConfig::new(8, Duration::from_millis(50))?;
//!
//! let reporter = Arc::new(ConsoleReporter::stdout(Markers::default()));
//! let connector = Arc::new(PostgresConnector::new());
//! let pool = WorkerPool::new(config, Arc::new(spec), connector, reporter)?;
//! pool.run().await; // never returns
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod pool;
pub mod reporter;
pub mod session;
pub mod telemetry;
pub mod test_spec;
pub mod validator;

pub use error::{ConfigError, DbError, Result, StormError};
