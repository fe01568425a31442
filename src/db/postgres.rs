//! PostgreSQL connector
//!
//! Concrete implementation using tokio-postgres.

use crate::config::Dsn;
use crate::db::provider::{Connection, Connector};
use crate::db::types::{CellValue, Row};
use crate::error::{DbError, DbResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::task::JoinHandle;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::Type;
use tokio_postgres::{Client, SimpleQueryMessage, SimpleQueryRow};

/// Opens tokio-postgres connections
///
/// Clones share the TLS configuration and the column-type cache, so the
/// OS trust store is read at most once per run.
#[derive(Debug, Clone, Default)]
pub struct PostgresConnector {
    state: Arc<ConnectorState>,
}

#[derive(Debug, Default)]
struct ConnectorState {
    tls: OnceLock<Arc<rustls::ClientConfig>>,
    /// Result column types per query; `None` when the query cannot be
    /// described (several statements, for instance)
    column_types: Mutex<HashMap<String, Option<Arc<[Type]>>>>,
}

impl PostgresConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// TLS client configuration, built on first use
    pub fn tls_config(&self) -> Arc<rustls::ClientConfig> {
        Arc::clone(self.state.tls.get_or_init(|| Arc::new(make_tls_config())))
    }

    fn cached_types(&self, sql: &str) -> Option<Option<Arc<[Type]>>> {
        let cache = self
            .state
            .column_types
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        cache.get(sql).cloned()
    }

    fn cache_types(&self, sql: &str, types: Option<Arc<[Type]>>) {
        let mut cache = self
            .state
            .column_types
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        cache.insert(sql.to_string(), types);
    }
}

impl Connector for PostgresConnector {
    type Connection = PostgresConnection;

    async fn connect(&self, dsn: &Dsn) -> DbResult<PostgresConnection> {
        let config = dsn.pg_config();
        let map_err = |e: tokio_postgres::Error| DbError::ConnectionFailed(e.to_string());

        let (client, driver) = match config.get_ssl_mode() {
            SslMode::Disable => {
                let (client, connection) =
                    config.connect(tokio_postgres::NoTls).await.map_err(map_err)?;
                (client, tokio::spawn(connection))
            }
            _ => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(
                    rustls::ClientConfig::clone(&self.tls_config()),
                );
                let (client, connection) = config.connect(tls).await.map_err(map_err)?;
                (client, tokio::spawn(connection))
            }
        };

        Ok(PostgresConnection {
            client,
            driver,
            connector: self.clone(),
            in_transaction: false,
            pending: None,
        })
    }
}

/// A single PostgreSQL session
///
/// Behaves like a non-autocommit driver: the first `execute` opens a
/// transaction that stays open until `commit`.
pub struct PostgresConnection {
    /// The tokio-postgres client
    client: Client,
    /// Background task driving the socket; finishes once the client is dropped
    driver: JoinHandle<Result<(), tokio_postgres::Error>>,
    connector: PostgresConnector,
    in_transaction: bool,
    /// Result of the last `execute`, waiting for `fetch_all`
    pending: Option<Option<Vec<Row>>>,
}

impl PostgresConnection {
    /// Look up the result column types of `sql`, describing it once per query.
    ///
    /// Only called outside a transaction: a rejected prepare would abort it.
    async fn describe(&self, sql: &str) -> Option<Arc<[Type]>> {
        if let Some(types) = self.connector.cached_types(sql) {
            return types;
        }
        match self.client.prepare(sql).await {
            Ok(stmt) => {
                let types: Arc<[Type]> =
                    stmt.columns().iter().map(|c| c.type_().clone()).collect();
                self.connector.cache_types(sql, Some(Arc::clone(&types)));
                Some(types)
            }
            Err(e) => {
                tracing::debug!(error = %e, "query cannot be described, comparing raw text");
                // Transport errors may be transient; server rejections are not
                if e.as_db_error().is_some() {
                    self.connector.cache_types(sql, None);
                }
                None
            }
        }
    }
}

impl Connection for PostgresConnection {
    async fn execute(&mut self, sql: &str) -> DbResult<()> {
        let map_err = |e: tokio_postgres::Error| DbError::QueryFailed(e.to_string());

        let mut types = None;
        if !self.in_transaction {
            types = self.describe(sql).await;
            self.client.batch_execute("BEGIN").await.map_err(map_err)?;
            self.in_transaction = true;
        }

        // Simple-query protocol: accepts several statements and returns text cells
        let messages = self.client.simple_query(sql).await.map_err(map_err)?;
        self.pending = Some(last_result_set(messages, types.as_deref()));
        Ok(())
    }

    async fn fetch_all(&mut self) -> DbResult<Option<Vec<Row>>> {
        self.pending.take().ok_or(DbError::NothingExecuted)
    }

    async fn commit(&mut self) -> DbResult<()> {
        if self.in_transaction {
            self.client
                .batch_execute("COMMIT")
                .await
                .map_err(|e| DbError::CommitFailed(e.to_string()))?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn close(self) -> DbResult<()> {
        let Self { client, driver, .. } = self;
        drop(client);
        match driver.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DbError::CloseFailed(e.to_string())),
            Err(e) => Err(DbError::CloseFailed(e.to_string())),
        }
    }
}

/// Keep the rows of the last statement in a simple-query response.
///
/// Returns `None` when the last statement was not row-returning
/// (e.g. `UPDATE` without `RETURNING`). `types` describes the columns of
/// that statement when the query could be described.
fn last_result_set(
    messages: Vec<SimpleQueryMessage>,
    types: Option<&[Type]>,
) -> Option<Vec<Row>> {
    let mut last = None;
    let mut current: Option<Vec<Row>> = None;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(_) => current = Some(Vec::new()),
            SimpleQueryMessage::Row(row) => {
                current
                    .get_or_insert_with(Vec::new)
                    .push(convert_row(&row, types));
            }
            SimpleQueryMessage::CommandComplete(_) => last = current.take(),
            _ => {}
        }
    }

    last
}

fn convert_row(row: &SimpleQueryRow, types: Option<&[Type]>) -> Row {
    Row {
        values: (0..row.len())
            .map(|i| {
                let ty = types.and_then(|t| t.get(i));
                row.get(i)
                    .map_or(CellValue::Null, |text| CellValue::Text(render_cell(ty, text)))
            })
            .collect(),
    }
}

/// Render a cell the way client drivers print decoded values:
/// booleans as `True`/`False`, whole floats with a trailing `.0`.
///
/// Other types keep PostgreSQL's text output.
fn render_cell(ty: Option<&Type>, text: &str) -> String {
    match ty {
        Some(t) if *t == Type::BOOL => match text {
            "t" => "True".to_string(),
            "f" => "False".to_string(),
            other => other.to_string(),
        },
        Some(t) if *t == Type::FLOAT4 || *t == Type::FLOAT8 => match text {
            "Infinity" => "inf".to_string(),
            "-Infinity" => "-inf".to_string(),
            "NaN" => "nan".to_string(),
            digits if !digits.contains(['.', 'e', 'E']) => format!("{digits}.0"),
            other => other.to_string(),
        },
        _ => text.to_string(),
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        tracing::debug!("no usable OS certificates, falling back to webpki roots");
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
