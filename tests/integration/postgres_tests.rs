//! Integration tests for PostgresConnector
//!
//! These tests require a PostgreSQL server and skip when none is reachable.

use crate::common::RecordingReporter;
use pgstorm::config::Dsn;
use pgstorm::db::types::CellValue;
use pgstorm::db::{Connection, Connector, PostgresConnection, PostgresConnector};
use pgstorm::error::DbError;
use pgstorm::session::TestSession;
use pgstorm::test_spec::{TestSpec, TestType};
use pgstorm::validator::Outcome;

/// Get test database DSN
fn test_dsn() -> Dsn {
    let host = std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("TEST_DB_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5433);
    let dbname = std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "postgres".to_string());
    let user = std::env::var("TEST_DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password =
        std::env::var("TEST_DB_PASSWORD").unwrap_or_else(|_| "test_password".to_string());
    Dsn::parse(&format!(
        "host={} port={} dbname={} user={} password={} sslmode=disable connect_timeout=2",
        host, port, dbname, user, password
    ))
    .unwrap()
}

async fn connect() -> Option<PostgresConnection> {
    let dsn = test_dsn();
    match PostgresConnector::new().connect(&dsn).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("Skipping test: Database not available at {} - {}", dsn, e);
            None
        }
    }
}

async fn run_query(sql: &str) -> Option<Option<Vec<pgstorm::db::Row>>> {
    let mut conn = connect().await?;
    conn.execute(sql).await.expect("query should succeed");
    let rows = conn.fetch_all().await.expect("rows should be buffered");
    conn.commit().await.expect("commit should succeed");
    conn.close().await.expect("close should succeed");
    Some(rows)
}

#[tokio::test]
async fn test_unreachable_server_fails_to_connect() {
    let dsn = Dsn::parse("host=127.0.0.1 port=1 user=nobody sslmode=disable connect_timeout=2")
        .unwrap();
    let result = PostgresConnector::new().connect(&dsn).await;
    assert!(matches!(result, Err(DbError::ConnectionFailed(_))));
}

#[tokio::test]
async fn test_execute_simple_query() {
    let Some(rows) = run_query("SELECT 1 AS num, 'hello' AS msg").await else {
        return;
    };
    let rows = rows.expect("SELECT returns a result set");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values[0], CellValue::Text("1".to_string()));
    assert_eq!(rows[0].values[1], CellValue::Text("hello".to_string()));
}

#[tokio::test]
async fn test_empty_select_is_an_empty_result_set() {
    let Some(rows) = run_query("SELECT 1 WHERE false").await else {
        return;
    };
    assert_eq!(rows, Some(Vec::new()));
}

#[tokio::test]
async fn test_null_cells() {
    let Some(rows) = run_query("SELECT NULL::int").await else {
        return;
    };
    assert_eq!(rows.unwrap()[0].values[0], CellValue::Null);
}

#[tokio::test]
async fn test_last_statement_wins() {
    let Some(rows) = run_query("SELECT 1; SELECT 2 UNION ALL SELECT 3").await else {
        return;
    };
    let rows = rows.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].values[0].as_text(), "2");
}

#[tokio::test]
async fn test_statement_without_result_set() {
    let Some(rows) =
        run_query("CREATE TEMP TABLE storm_t (x int); INSERT INTO storm_t VALUES (1)").await
    else {
        return;
    };
    assert_eq!(rows, None);
}

#[tokio::test]
async fn test_invalid_query_fails() {
    let Some(mut conn) = connect().await else {
        return;
    };
    let result = conn.execute("SELEC broken").await;
    assert!(matches!(result, Err(DbError::QueryFailed(_))));
    let _ = conn.close().await;
}

#[tokio::test]
async fn test_fetch_before_execute() {
    let Some(mut conn) = connect().await else {
        return;
    };
    assert!(matches!(
        conn.fetch_all().await,
        Err(DbError::NothingExecuted)
    ));
    conn.close().await.unwrap();
}

/// Run one session checking that the first value of `sql` reads as `expected`
async fn first_value_outcome(sql: &str, expected: &str) -> Option<Outcome> {
    connect().await?;
    let spec = TestSpec::new(sql, test_dsn(), TestType::FirstValueEquals, Some(expected)).unwrap();
    let reporter = RecordingReporter::default();
    let outcome = TestSession::new(0)
        .run(&PostgresConnector::new(), &spec, &reporter)
        .await
        .unwrap();
    Some(outcome)
}

#[tokio::test]
async fn test_first_value_renders_like_driver_values() {
    let cases = [
        ("SELECT true", "True", Outcome::Pass),
        ("SELECT false", "False", Outcome::Pass),
        ("SELECT true", "t", Outcome::Fail),
        ("SELECT 't'::text", "t", Outcome::Pass),
        ("SELECT NULL::int", "None", Outcome::Pass),
        ("SELECT 1::float8", "1.0", Outcome::Pass),
        ("SELECT 42", "42", Outcome::Pass),
        ("SELECT 42.50::numeric(5,2)", "42.50", Outcome::Pass),
    ];
    for (sql, expected, want) in cases {
        let Some(outcome) = first_value_outcome(sql, expected).await else {
            return;
        };
        assert_eq!(outcome, want, "{sql} vs {expected}");
    }
}

#[tokio::test]
async fn test_multi_statement_queries_compare_raw_text() {
    let Some(outcome) = first_value_outcome("SELECT 1; SELECT true", "t").await else {
        return;
    };
    assert_eq!(outcome, Outcome::Pass);
}

#[tokio::test]
async fn test_connections_share_tls_config() {
    let connector = PostgresConnector::new();
    let before = connector.tls_config();
    let dsn = Dsn::parse("host=127.0.0.1 port=1 user=nobody sslmode=prefer connect_timeout=2")
        .unwrap();

    for _ in 0..2 {
        assert!(connector.connect(&dsn).await.is_err());
    }

    assert!(std::sync::Arc::ptr_eq(&before, &connector.tls_config()));
}

#[tokio::test]
async fn test_full_session_against_server() {
    if connect().await.is_none() {
        return;
    }
    let spec = TestSpec::new(
        "SELECT generate_series(1, 3)",
        test_dsn(),
        TestType::RowCountEquals,
        Some("3"),
    )
    .unwrap();
    let reporter = RecordingReporter::default();

    let outcome = TestSession::new(0)
        .run(&PostgresConnector::new(), &spec, &reporter)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Pass);
    assert_eq!(reporter.outcomes(), vec![Outcome::Pass]);
}
