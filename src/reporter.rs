//! Live progress output
//!
//! One symbol per finished session, written and flushed immediately with no
//! separators. The write lock covers only the I/O, never validation.

use crate::error::DbError;
use crate::validator::Outcome;
use serde::Serialize;
use std::fmt;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives the result of every session
///
/// Called concurrently from many sessions; implementations synchronize
/// internally.
pub trait Reporter: Send + Sync + 'static {
    /// A session reached the validator
    fn report(&self, outcome: Outcome);

    /// A session ended before validation (connect, query, commit or close failed)
    fn report_error(&self, error: &DbError);
}

/// Symbols written for each kind of result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Markers {
    pub pass: char,
    pub fail: char,
    /// `None` leaves infrastructure failures out of the stream
    pub error: Option<char>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            pass: '.',
            fail: 'E',
            error: None,
        }
    }
}

/// Running totals
#[derive(Debug, Default)]
pub struct Tally {
    passed: AtomicU64,
    failed: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of a [`Tally`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TallySnapshot {
    pub passed: u64,
    pub failed: u64,
    pub errors: u64,
}

impl Tally {
    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Pass => &self.passed,
            Outcome::Fail => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for TallySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passed: {}, failed: {}, errors: {}",
            self.passed, self.failed, self.errors
        )
    }
}

/// Writes markers to a console stream (stdout by default)
pub struct ConsoleReporter<W = Stdout> {
    out: Mutex<W>,
    markers: Markers,
    tally: Tally,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout(markers: Markers) -> Self {
        Self::new(io::stdout(), markers)
    }
}

impl<W: Write + Send + 'static> ConsoleReporter<W> {
    pub fn new(out: W, markers: Markers) -> Self {
        Self {
            out: Mutex::new(out),
            markers,
            tally: Tally::default(),
        }
    }

    pub fn tally(&self) -> TallySnapshot {
        self.tally.snapshot()
    }

    /// Consume the reporter and return the underlying writer
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, marker: char) {
        let mut buf = [0u8; 4];
        let bytes = marker.encode_utf8(&mut buf).as_bytes();
        // A poisoned lock only means another writer panicked mid-write
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
            tracing::debug!(error = %e, "failed to write progress marker");
        }
    }
}

impl<W: Write + Send + 'static> Reporter for ConsoleReporter<W> {
    fn report(&self, outcome: Outcome) {
        self.tally.record(outcome);
        let marker = match outcome {
            Outcome::Pass => self.markers.pass,
            Outcome::Fail => self.markers.fail,
        };
        self.emit(marker);
    }

    fn report_error(&self, _error: &DbError) {
        self.tally.record_error();
        if let Some(marker) = self.markers.error {
            self.emit(marker);
        }
    }
}
