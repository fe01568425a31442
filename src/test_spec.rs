//! What every session runs and what it expects back
//!
//! A [`TestSpec`] is built once before the pool starts and shared read-only
//! by all sessions. Building it is where the test type and check value are
//! cross-validated, so sessions never see an inconsistent combination.

use crate::config::Dsn;
use crate::error::{ConfigError, ConfigResult};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
pub enum TestType {
    /// Query must return at least one row
    #[value(name = "M", alias = "must-have-rows")]
    MustHaveRows,
    /// Query must return exactly `--value` rows
    #[value(name = "N", alias = "row-count-equals")]
    RowCountEquals,
    /// First column of the first row must equal `--value`
    #[value(name = "E", alias = "first-value-equals")]
    FirstValueEquals,
}

impl TestType {
    /// Single-letter code used on the command line
    pub fn code(self) -> &'static str {
        match self {
            TestType::MustHaveRows => "M",
            TestType::RowCountEquals => "N",
            TestType::FirstValueEquals => "E",
        }
    }

    pub fn needs_check_value(self) -> bool {
        !matches!(self, TestType::MustHaveRows)
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A resolved expectation: test type with its check value already parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    MustHaveRows,
    RowCountEquals(i64),
    FirstValueEquals(String),
}

impl Expectation {
    /// Cross-validate a test type against its optional check value
    pub fn new(test_type: TestType, check_value: Option<&str>) -> ConfigResult<Self> {
        match (test_type, check_value) {
            (TestType::MustHaveRows, None) => Ok(Expectation::MustHaveRows),
            (TestType::MustHaveRows, Some(_)) => {
                Err(ConfigError::UnexpectedCheckValue(test_type.code()))
            }
            (_, None | Some("")) => Err(ConfigError::MissingCheckValue(test_type.code())),
            (TestType::RowCountEquals, Some(value)) => value
                .trim()
                .parse::<i64>()
                .map(Expectation::RowCountEquals)
                .map_err(|e| ConfigError::InvalidCheckValue {
                    value: value.to_string(),
                    reason: e.to_string(),
                }),
            (TestType::FirstValueEquals, Some(value)) => {
                Ok(Expectation::FirstValueEquals(value.to_string()))
            }
        }
    }

    pub fn test_type(&self) -> TestType {
        match self {
            Expectation::MustHaveRows => TestType::MustHaveRows,
            Expectation::RowCountEquals(_) => TestType::RowCountEquals,
            Expectation::FirstValueEquals(_) => TestType::FirstValueEquals,
        }
    }
}

/// Immutable description of the test every session performs
#[derive(Debug, Clone)]
pub struct TestSpec {
    query: String,
    dsn: Dsn,
    expectation: Expectation,
}

impl TestSpec {
    /// Build a spec, rejecting an empty query or a mismatched check value
    pub fn new(
        query: impl Into<String>,
        dsn: Dsn,
        test_type: TestType,
        check_value: Option<&str>,
    ) -> ConfigResult<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ConfigError::Invalid("query is empty".into()));
        }
        let expectation = Expectation::new(test_type, check_value)?;
        Ok(Self {
            query,
            dsn,
            expectation,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub fn test_type(&self) -> TestType {
        self.expectation.test_type()
    }
}
