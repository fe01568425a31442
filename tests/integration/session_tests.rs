//! Test session lifecycle against the scripted connector

use crate::common::{Behavior, RecordingReporter, ScriptedConnector, Stats, rows, test_spec};
use pgstorm::error::DbError;
use pgstorm::session::TestSession;
use pgstorm::test_spec::TestType;
use pgstorm::validator::Outcome;

#[test]
fn test_successful_session_reports_once() {
    let connector = ScriptedConnector::new(Behavior::Rows(rows(3)));
    let spec = test_spec(TestType::RowCountEquals, Some("3"));
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert_eq!(outcome.unwrap(), Outcome::Pass);
    assert_eq!(reporter.outcomes(), vec![Outcome::Pass]);
    assert_eq!(Stats::get(&connector.stats.commits), 1);
    assert_eq!(Stats::get(&connector.stats.closes), 1);
    assert_eq!(Stats::get(&connector.stats.live), 0);
}

#[test]
fn test_mismatch_is_reported_as_fail() {
    let connector = ScriptedConnector::new(Behavior::Rows(rows(2)));
    let spec = test_spec(TestType::RowCountEquals, Some("3"));
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(1).run(&connector, &spec, &reporter));

    assert_eq!(outcome.unwrap(), Outcome::Fail);
    assert_eq!(reporter.outcomes(), vec![Outcome::Fail]);
}

#[test]
fn test_no_result_set_fails_validation() {
    let connector = ScriptedConnector::new(Behavior::NoResultSet);
    let spec = test_spec(TestType::MustHaveRows, None);
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert_eq!(outcome.unwrap(), Outcome::Fail);
    assert_eq!(reporter.outcomes(), vec![Outcome::Fail]);
}

#[test]
fn test_connect_failure_propagates_without_report() {
    let connector = ScriptedConnector::new(Behavior::Unreachable);
    let spec = test_spec(TestType::MustHaveRows, None);
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert!(matches!(outcome, Err(DbError::ConnectionFailed(_))));
    assert!(reporter.outcomes().is_empty());
    assert_eq!(Stats::get(&connector.stats.closes), 0);
}

#[test]
fn test_query_failure_still_closes() {
    let connector = ScriptedConnector::new(Behavior::QueryFails);
    let spec = test_spec(TestType::MustHaveRows, None);
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert!(matches!(outcome, Err(DbError::QueryFailed(_))));
    assert!(reporter.outcomes().is_empty());
    assert_eq!(Stats::get(&connector.stats.closes), 1);
    assert_eq!(Stats::get(&connector.stats.live), 0);
}

#[test]
fn test_commit_failure_still_closes_and_reports_nothing() {
    let connector = ScriptedConnector::new(Behavior::CommitFails);
    let spec = test_spec(TestType::MustHaveRows, None);
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert!(matches!(outcome, Err(DbError::CommitFailed(_))));
    assert!(reporter.outcomes().is_empty());
    assert_eq!(Stats::get(&connector.stats.closes), 1);
}

#[test]
fn test_close_failure_reports_nothing() {
    let connector = ScriptedConnector::new(Behavior::CloseFails);
    let spec = test_spec(TestType::MustHaveRows, None);
    let reporter = RecordingReporter::default();

    let outcome = tokio_test::block_on(TestSession::new(0).run(&connector, &spec, &reporter));

    assert!(matches!(outcome, Err(DbError::CloseFailed(_))));
    assert!(reporter.outcomes().is_empty());
}
