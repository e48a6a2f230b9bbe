//! Report execution against the pooled SQLite database.
//!
//! ```text
//! Executor::fetch(sql, params, aliases)
//!        │
//!        ├── spawn_blocking ──► pool.get_timeout(remaining) ──► prepare ──► bind ──► step rows
//!        │                          │
//!        │                          └── progress handler polls the cancel flag and deadline
//!        │
//!        └── tokio::time::timeout(report.timeout)
//!                 └── on expiry: raise the cancel flag
//! ```
//!
//! Each call holds at most one pooled connection, and only until its
//! deadline. Checkout never waits past the deadline, a statement that starts
//! late aborts on its first progress callback, and the `PooledConnection`
//! guard returns the connection on every exit path.

mod error;
mod pool;

pub use error::{ExecuteError, ExecuteResult};
pub use pool::{ConnectionPool, DatabaseTarget, SqliteConnectionManager};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::{json, Map, Value};

use crate::sql::BoundValue;

/// SQLite VM instructions between cancellation checks.
const PROGRESS_OPS: i32 = 1_000;

/// One result row, keyed by output alias in projection order.
pub type Row = Map<String, Value>;

/// Runs parameterized SQL and materializes rows.
#[derive(Debug, Clone)]
pub struct Executor {
    pool: ConnectionPool,
    timeout: Duration,
}

impl Executor {
    pub fn new(pool: ConnectionPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute `sql` with `params` bound to its placeholders.
    ///
    /// Row keys come from `aliases` by position; when the statement yields a
    /// different number of columns, the statement's own column names are used.
    pub async fn fetch(
        &self,
        sql: String,
        params: Vec<BoundValue>,
        aliases: Vec<String>,
    ) -> ExecuteResult<Vec<Row>> {
        let pool = self.pool.clone();
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let task = tokio::task::spawn_blocking(move || {
            let wait = pool
                .connection_timeout()
                .min(deadline.saturating_duration_since(Instant::now()));
            let conn = pool.get_timeout(wait).map_err(|e| {
                if expired(&flag, deadline) {
                    return ExecuteError::Timeout(timeout);
                }
                tracing::warn!(error = %e, "No database connection available");
                ExecuteError::PoolExhausted(e)
            })?;

            // Checked out after the caller gave up
            if expired(&flag, deadline) {
                return Err(ExecuteError::Timeout(timeout));
            }

            let watch = Arc::clone(&flag);
            conn.progress_handler(PROGRESS_OPS, Some(move || expired(&watch, deadline)));
            let result = run_query(&conn, &sql, &params, &aliases);
            conn.progress_handler(0, None::<fn() -> bool>);

            result.map_err(|e| {
                if expired(&flag, deadline) {
                    ExecuteError::Timeout(timeout)
                } else {
                    e
                }
            })
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                cancelled.store(true, Ordering::Release);
                tracing::warn!(timeout = ?timeout, "Report query timed out");
                Err(ExecuteError::Timeout(timeout))
            }
        }
    }
}

/// True once the caller has given up or the deadline has passed.
fn expired(cancelled: &AtomicBool, deadline: Instant) -> bool {
    cancelled.load(Ordering::Acquire) || Instant::now() >= deadline
}

fn run_query(
    conn: &Connection,
    sql: &str,
    params: &[BoundValue],
    aliases: &[String],
) -> ExecuteResult<Vec<Row>> {
    let mut statement = conn.prepare(sql)?;

    let keys: Vec<String> = if statement.column_count() == aliases.len() {
        aliases.to_vec()
    } else {
        statement
            .column_names()
            .iter()
            .map(ToString::to_string)
            .collect()
    };

    let values = params.iter().map(sql_value_from_bound);
    let mut rows = statement.query(params_from_iter(values))?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Map::new();
        for (index, key) in keys.iter().enumerate() {
            let value = row.get::<usize, SqlValue>(index)?;
            record.insert(key.clone(), json_value_from_sql(value));
        }
        result.push(record);
    }

    Ok(result)
}

fn sql_value_from_bound(value: &BoundValue) -> SqlValue {
    match value {
        BoundValue::Int(n) => SqlValue::Integer(*n),
        BoundValue::Float(f) => SqlValue::Real(*f),
        BoundValue::Text(s) => SqlValue::Text(s.clone()),
        BoundValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
    }
}

fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => json!(n),
        // NaN/inf have no JSON form and become null
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(bytes) => Value::String(encode_hex(&bytes)),
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}
