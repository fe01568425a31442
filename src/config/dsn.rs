//! Connection target
//!
//! A DSN is accepted in either libpq form: key/value
//! (`host=localhost dbname=postgres user=me`) or URL
//! (`postgresql://me@localhost:5432/postgres`). It is parsed once at startup
//! and shared read-only by every session.

use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::config::{Host, SslMode};

/// A validated connection descriptor
#[derive(Clone)]
pub struct Dsn {
    raw: String,
    config: tokio_postgres::Config,
}

impl Dsn {
    /// Parse and validate a DSN string
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidDsn("DSN is empty".into()));
        }
        let config = tokio_postgres::Config::from_str(raw)
            .map_err(|e| ConfigError::InvalidDsn(e.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            config,
        })
    }

    /// The DSN exactly as given (may contain a password)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed tokio-postgres configuration
    pub fn pg_config(&self) -> &tokio_postgres::Config {
        &self.config
    }

    /// Whether connections will be attempted over TLS
    pub fn uses_tls(&self) -> bool {
        self.config.get_ssl_mode() != SslMode::Disable
    }
}

impl FromStr for Dsn {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        Self::parse(s)
    }
}

/// Password-free `user@host:port/dbname`, safe for logs
impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = self
            .config
            .get_hosts()
            .first()
            .map_or_else(|| "localhost".to_string(), host_name);
        let port = self.config.get_ports().first().copied().unwrap_or(5432);
        if let Some(user) = self.config.get_user() {
            write!(f, "{}@", user)?;
        }
        write!(f, "{}:{}", host, port)?;
        if let Some(dbname) = self.config.get_dbname() {
            write!(f, "/{}", dbname)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dsn").field(&self.to_string()).finish()
    }
}

fn host_name(host: &Host) -> String {
    match host {
        Host::Tcp(name) => name.clone(),
        #[cfg(unix)]
        Host::Unix(path) => path.display().to_string(),
    }
}
