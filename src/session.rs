//! One connect, query, commit, disconnect, validate cycle
//!
//! A session is single-shot. Database failures are returned to the caller
//! and never reach the validator, so they produce no pass/fail verdict.

use crate::db::provider::{Connection, Connector};
use crate::db::types::Row;
use crate::error::DbResult;
use crate::reporter::Reporter;
use crate::test_spec::TestSpec;
use crate::validator::{Outcome, validate};
use tracing::debug;

/// A session bound to one worker slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestSession {
    id: usize,
}

impl TestSession {
    pub fn new(id: usize) -> Self {
        Self { id }
    }

    /// Slot index this session occupies
    pub fn id(&self) -> usize {
        self.id
    }

    /// Run the full cycle and forward the verdict to `reporter`.
    ///
    /// Commit and close are attempted even when the query fails; the first
    /// error encountered is returned and nothing is reported.
    pub async fn run<C, R>(
        &self,
        connector: &C,
        spec: &TestSpec,
        reporter: &R,
    ) -> DbResult<Outcome>
    where
        C: Connector,
        R: Reporter + ?Sized,
    {
        debug!(slot = self.id, "connecting to {}", spec.dsn());
        let mut conn = connector.connect(spec.dsn()).await?;

        debug!(slot = self.id, "executing query");
        let fetched = execute_and_fetch(&mut conn, spec.query()).await;

        debug!(slot = self.id, "committing transaction");
        let committed = conn.commit().await;

        debug!(slot = self.id, "disconnecting");
        let closed = conn.close().await;

        if let Err(e) = &closed
            && (fetched.is_err() || committed.is_err())
        {
            debug!(slot = self.id, error = %e, "close also failed");
        }
        let rows = fetched?;
        committed?;
        closed?;

        let outcome = validate(rows.as_deref(), spec.expectation());
        debug!(slot = self.id, ?outcome, "test complete");
        reporter.report(outcome);
        Ok(outcome)
    }
}

async fn execute_and_fetch<T: Connection>(
    conn: &mut T,
    sql: &str,
) -> DbResult<Option<Vec<Row>>> {
    conn.execute(sql).await?;
    conn.fetch_all().await
}
