//! Worker pool
//!
//! A fixed array of slots, each holding the task handle of the session last
//! launched into it. The manager scans the slots in index order, relaunches
//! every slot whose session has finished (or that never had one), sleeps for
//! the poll delay and repeats forever. Liveness comes from the task handle
//! itself; sessions never report back to the manager.

use crate::db::provider::Connector;
use crate::error::{ConfigError, ConfigResult, DbError, Result, StormError};
use crate::reporter::Reporter;
use crate::session::TestSession;
use crate::test_spec::TestSpec;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug_span, error, info, warn};

/// Pool sizing and pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolConfig {
    /// Number of slots, at least one
    pub workers: usize,
    /// Sleep between scans
    pub poll_delay: Duration,
    /// Abandon sessions running longer than this
    pub session_timeout: Option<Duration>,
}

impl PoolConfig {
    pub fn new(workers: usize, poll_delay: Duration) -> ConfigResult<Self> {
        if workers == 0 {
            return Err(ConfigError::Invalid("worker count must be at least 1".into()));
        }
        Ok(Self {
            workers,
            poll_delay,
            session_timeout: None,
        })
    }

    pub fn with_session_timeout(mut self, timeout: Option<Duration>) -> ConfigResult<Self> {
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Invalid(
                "session timeout must be greater than zero".into(),
            ));
        }
        self.session_timeout = timeout;
        Ok(self)
    }
}

/// Keeps every slot busy with a fresh session
pub struct WorkerPool<C, R> {
    config: PoolConfig,
    spec: Arc<TestSpec>,
    connector: Arc<C>,
    reporter: Arc<R>,
    slots: Vec<Option<JoinHandle<()>>>,
    runtime: Handle,
    launched: u64,
}

impl<C: Connector, R: Reporter> WorkerPool<C, R> {
    /// Create a pool with every slot empty.
    ///
    /// # Errors
    /// Fails if called outside a tokio runtime (sessions could not be spawned)
    /// or if the configuration has no slots.
    pub fn new(
        config: PoolConfig,
        spec: Arc<TestSpec>,
        connector: Arc<C>,
        reporter: Arc<R>,
    ) -> Result<Self> {
        if config.workers == 0 {
            return Err(ConfigError::Invalid("worker count must be at least 1".into()).into());
        }
        let runtime = Handle::try_current()
            .map_err(|e| StormError::Pool(format!("no runtime to spawn sessions on: {}", e)))?;
        let slots = (0..config.workers).map(|_| None).collect();

        Ok(Self {
            config,
            spec,
            connector,
            reporter,
            slots,
            runtime,
            launched: 0,
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots whose session is still running
    pub fn live_sessions(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.as_ref().is_some_and(|h| !h.is_finished()))
            .count()
    }

    /// Total sessions launched since the pool was created
    pub fn launched(&self) -> u64 {
        self.launched
    }

    /// Scan all slots once, launching a session into each idle one.
    ///
    /// Returns how many sessions were launched.
    pub async fn scan(&mut self) -> usize {
        let mut started = 0;
        for slot in 0..self.slots.len() {
            let idle = match self.slots[slot].take() {
                None => true,
                Some(handle) if handle.is_finished() => {
                    // Already complete, so this resolves without waiting
                    if let Err(e) = handle.await
                        && e.is_panic()
                    {
                        error!(slot, "session panicked");
                    }
                    info!(slot, "worker {} recycled", slot);
                    true
                }
                Some(handle) => {
                    self.slots[slot] = Some(handle);
                    false
                }
            };

            if idle {
                self.slots[slot] = Some(self.spawn_session(slot));
                started += 1;
            }
        }
        self.launched += started as u64;
        started
    }

    /// Scan forever. Only process interruption ends a run.
    pub async fn run(mut self) -> Infallible {
        info!(
            workers = self.config.workers,
            poll_delay = ?self.config.poll_delay,
            "worker pool started"
        );
        loop {
            self.scan().await;
            if self.config.poll_delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.config.poll_delay).await;
            }
        }
    }

    fn spawn_session(&self, slot: usize) -> JoinHandle<()> {
        let connector = Arc::clone(&self.connector);
        let spec = Arc::clone(&self.spec);
        let reporter = Arc::clone(&self.reporter);
        let deadline = self.config.session_timeout;

        let task = async move {
            let session = TestSession::new(slot);
            let cycle = session.run(connector.as_ref(), &spec, reporter.as_ref());
            let result = match deadline {
                Some(limit) => tokio::time::timeout(limit, cycle)
                    .await
                    .unwrap_or(Err(DbError::Timeout)),
                None => cycle.await,
            };
            if let Err(e) = result {
                warn!(error = %e, "session ended before validation");
                reporter.report_error(&e);
            }
        };

        self.runtime.spawn(task.instrument(debug_span!("session", slot)))
    }
}
