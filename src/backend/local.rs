//! Embedded SQLite execution strategy.
//!
//! Runs queries against the analytics store at `local_store_path` through a
//! lazily opened sqlx pool. Opening is deferred to the first query, so a
//! missing or unreadable store is reported as a local execution failure.

use super::{QueryBackend, RawOutcome};
use crate::error::{QueryError, Result};
use crate::query::{Record, ValidatedRequest};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Maximum pooled connections to the embedded store.
const MAX_CONNECTIONS: u32 = 4;

/// How long to wait for a pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// How long SQLite waits on a locked database before failing.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// SQLite execution strategy.
#[derive(Debug)]
pub struct LocalBackend {
    pool: SqlitePool,
    path: PathBuf,
}

impl LocalBackend {
    /// Creates a backend for the store at `path` without opening it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_lazy_with(options);

        Self {
            pool,
            path: path.to_path_buf(),
        }
    }

    /// Reads column names from the prepared statement.
    ///
    /// Used when a query matched no rows, so there is no row to read them
    /// from. Best-effort: an error yields no columns.
    async fn describe_columns(&self, sql: &str) -> Vec<String> {
        match (&self.pool).prepare(sql).await {
            Ok(statement) => statement
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect(),
            Err(e) => {
                debug!("Could not describe columns of empty result: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QueryBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn execute(&self, request: &ValidatedRequest) -> Result<RawOutcome> {
        debug!("Executing local query against {}", self.path.display());

        let query = request
            .parameters
            .iter()
            .fold(sqlx::query(&request.text), bind_parameter);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| QueryError::local(format_local_error(e, &self.path)))?;

        let columns = match rows.first() {
            Some(first) => first
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect(),
            None => self.describe_columns(&request.text).await,
        };

        let records = rows.iter().map(convert_row).collect();
        Ok(RawOutcome::new(records, columns))
    }
}

/// Binds one JSON parameter positionally.
///
/// Arrays and objects have no SQLite counterpart and are bound as JSON text.
fn bind_parameter<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// Formats a sqlx error for the failure message.
fn format_local_error(error: sqlx::Error, path: &Path) -> String {
    match error {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::PoolTimedOut => format!(
            "timed out waiting for a connection to {}",
            path.display()
        ),
        sqlx::Error::Io(e) => format!("cannot open store {}: {e}", path.display()),
        other => other.to_string(),
    }
}

/// Converts a sqlx SqliteRow to a record keyed by column name.
fn convert_row(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| (col.name().to_string(), convert_value(row, i)))
        .collect()
}

/// Converts a single column value by its runtime storage class.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return Value::Null,
    };

    match storage_class.as_str() {
        "INTEGER" | "INT" | "BIGINT" | "BOOLEAN" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),

        // TEXT, and any declared type SQLite stores as text
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
