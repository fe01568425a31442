//! Database abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of
//! operations a test session performs, allowing the pool to run against
//! PostgreSQL or an in-memory script in tests.

pub mod postgres;
pub mod provider;
pub mod types;

// Re-export main types
pub use postgres::{PostgresConnection, PostgresConnector};
pub use provider::{Connection, Connector};
pub use types::{CellValue, Row};
