//! Result validation
//!
//! Decides whether one session's rows meet the expectation. A mismatch is an
//! ordinary [`Outcome::Fail`], never an error.

use crate::db::types::Row;
use crate::test_spec::Expectation;
use serde::Serialize;

/// Verdict for one completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn is_pass(self) -> bool {
        self == Outcome::Pass
    }
}

/// Check `rows` against `expectation`.
///
/// `rows` is `None` when the query produced no result set; that always fails.
pub fn validate(rows: Option<&[Row]>, expectation: &Expectation) -> Outcome {
    let Some(rows) = rows else {
        return Outcome::Fail;
    };

    let passed = match expectation {
        Expectation::MustHaveRows => !rows.is_empty(),
        Expectation::RowCountEquals(expected) => {
            usize::try_from(*expected).is_ok_and(|n| n == rows.len())
        }
        Expectation::FirstValueEquals(expected) => rows
            .first()
            .and_then(Row::first)
            .is_some_and(|cell| cell.as_text() == expected.as_str()),
    };

    if passed { Outcome::Pass } else { Outcome::Fail }
}
