//! Database capability traits
//!
//! A session only needs to connect, run one query, read its rows, commit and
//! disconnect. These traits are that capability and nothing more, so the
//! worker pool can be driven by a real server or an in-memory script.

use crate::config::Dsn;
use crate::db::types::Row;
use crate::error::DbResult;
use std::future::Future;

/// Opens new connections to a target
///
/// One connector is shared by every worker; each session calls
/// [`Connector::connect`] once and owns the resulting connection.
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    /// Establish a fresh connection to `dsn`
    ///
    /// # Errors
    /// Returns `DbError::ConnectionFailed` if the target cannot be reached
    fn connect(&self, dsn: &Dsn) -> impl Future<Output = DbResult<Self::Connection>> + Send;
}

/// A live connection owned by exactly one session
pub trait Connection: Send + 'static {
    /// Execute the SQL text, buffering whatever the last statement returns
    ///
    /// # Errors
    /// Returns `DbError::QueryFailed` if execution fails
    fn execute(&mut self, sql: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Take the rows produced by the last `execute`
    ///
    /// `None` means the last statement produced no result set.
    ///
    /// # Errors
    /// Returns `DbError::NothingExecuted` if nothing was executed
    fn fetch_all(&mut self) -> impl Future<Output = DbResult<Option<Vec<Row>>>> + Send;

    /// Commit the open transaction, if any
    ///
    /// # Errors
    /// Returns `DbError::CommitFailed` if the server rejects the commit
    fn commit(&mut self) -> impl Future<Output = DbResult<()>> + Send;

    /// Close the connection
    ///
    /// # Errors
    /// Returns `DbError::CloseFailed` if the connection ends with an error
    fn close(self) -> impl Future<Output = DbResult<()>> + Send;
}
