//! Error types for pgstorm
//!
//! This module defines the error hierarchy used throughout the crate.
//! Configuration errors abort a run before the pool starts; database errors
//! end a single session and are never retried.

use std::io;

/// Main error type for pgstorm
#[derive(Debug, thiserror::Error)]
pub enum StormError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The worker pool could not launch sessions
    #[error("Worker pool error: {0}")]
    Pool(String),
}

/// Errors raised while a session talks to the database
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Failed to establish connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// COMMIT was rejected
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// Closing the connection reported an error
    #[error("Close failed: {0}")]
    CloseFailed(String),

    /// `fetch_all` called before `execute`
    #[error("No query has been executed on this connection")]
    NothingExecuted,

    /// Session exceeded its deadline
    #[error("Session timed out")]
    Timeout,
}

/// Configuration loading and cross-validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Config file not found
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read a file
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// DSN could not be parsed
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),

    /// Test type needs a check value but none was given
    #[error("--value must be set for test type {0}")]
    MissingCheckValue(&'static str),

    /// Test type takes no check value but one was given
    #[error("--value must not be set for test type {0}")]
    UnexpectedCheckValue(&'static str),

    /// Check value is not usable for its test type
    #[error("Invalid check value '{value}': {reason}")]
    InvalidCheckValue { value: String, reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Specialized Result type for pgstorm operations
pub type Result<T> = std::result::Result<T, StormError>;

/// Specialized Result type for database operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
