//! SQLite connection pool.
//!
//! An `r2d2` pool of `rusqlite` connections. Every connection is configured
//! the same way when it is opened:
//!
//! - `case_sensitive_like` so `LIKE` matches PostgreSQL semantics
//! - `ceil`/`floor` scalar functions for the numeric function library
//!
//! File databases are opened read-only; reports never write.

use std::path::PathBuf;
use std::time::Duration;

use r2d2::{ManageConnection, Pool, PooledConnection};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use tracing::instrument;

use super::error::{ExecuteError, ExecuteResult};
use crate::config::DatabaseSettings;

/// Where connections point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// A database file, opened read-only.
    File(PathBuf),
    /// A named in-memory database shared by every connection of the pool.
    /// It lives as long as at least one connection stays open.
    Memory(String),
}

impl DatabaseTarget {
    /// Interpret a configured path. `:memory:` maps to a pool-private
    /// in-memory database.
    pub fn from_path(path: &str) -> Self {
        if path == ":memory:" {
            DatabaseTarget::Memory("adhoc".to_string())
        } else {
            DatabaseTarget::File(PathBuf::from(path))
        }
    }
}

/// `r2d2` connection manager for SQLite.
#[derive(Debug, Clone)]
pub struct SqliteConnectionManager {
    target: DatabaseTarget,
}

impl SqliteConnectionManager {
    pub fn new(target: DatabaseTarget) -> Self {
        Self { target }
    }
}

impl ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> Result<Connection, rusqlite::Error> {
        let conn = match &self.target {
            DatabaseTarget::File(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
            DatabaseTarget::Memory(name) => Connection::open_with_flags(
                format!("file:{}?mode=memory&cache=shared", name),
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?,
        };
        configure_connection(&conn)?;
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch("SELECT 1")
    }

    fn has_broken(&self, _conn: &mut Connection) -> bool {
        false
    }
}

/// Apply per-connection settings and register scalar functions.
fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA case_sensitive_like = ON;")?;

    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function("ceil", 1, flags, |ctx| {
        let value: Option<f64> = ctx.get(0)?;
        Ok(value.map(f64::ceil))
    })?;
    conn.create_scalar_function("floor", 1, flags, |ctx| {
        let value: Option<f64> = ctx.get(0)?;
        Ok(value.map(f64::floor))
    })?;

    Ok(())
}

/// A pool of configured SQLite connections.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state();
        f.debug_struct("ConnectionPool")
            .field("connections", &state.connections)
            .field("idle", &state.idle_connections)
            .finish()
    }
}

impl ConnectionPool {
    /// Create a pool from database settings.
    #[instrument(name = "executor.create_pool", skip(settings))]
    pub fn from_settings(settings: &DatabaseSettings) -> ExecuteResult<Self> {
        let path = settings
            .resolved_path()
            .map_err(|e| ExecuteError::Connection(e.to_string()))?;
        let timeout = settings
            .pool
            .connection_timeout()
            .map_err(|e| ExecuteError::Connection(e.to_string()))?;

        Self::build(
            DatabaseTarget::from_path(&path),
            settings.pool.max_size,
            settings.pool.min_idle,
            timeout,
        )
    }

    /// Create a pool over a named shared in-memory database.
    ///
    /// The pool keeps one connection open so the database survives between
    /// checkouts.
    pub fn in_memory(name: &str) -> ExecuteResult<Self> {
        Self::build(
            DatabaseTarget::Memory(name.to_string()),
            4,
            Some(1),
            Duration::from_secs(5),
        )
    }

    /// Create a pool with explicit sizing.
    pub fn build(
        target: DatabaseTarget,
        max_size: u32,
        min_idle: Option<u32>,
        connection_timeout: Duration,
    ) -> ExecuteResult<Self> {
        tracing::debug!(?target, max_size, "Creating SQLite connection pool");
        let manager = SqliteConnectionManager::new(target);

        let inner = Pool::builder()
            .max_size(max_size)
            .min_idle(min_idle)
            .connection_timeout(connection_timeout)
            .build(manager)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create connection pool");
                ExecuteError::Connection(e.to_string())
            })?;

        Ok(Self { inner })
    }

    /// Check out a connection, waiting at most the configured timeout.
    ///
    /// The connection returns to the pool when the guard is dropped.
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.inner.get()
    }

    /// Check out a connection, waiting at most `timeout`.
    pub fn get_timeout(
        &self,
        timeout: Duration,
    ) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.inner.get_timeout(timeout)
    }

    /// Longest a plain [`get`](Self::get) waits for a free connection.
    pub fn connection_timeout(&self) -> Duration {
        self.inner.connection_timeout()
    }

    /// Number of connections currently idle in the pool.
    pub fn idle_connections(&self) -> u32 {
        self.inner.state().idle_connections
    }

    pub fn max_size(&self) -> u32 {
        self.inner.max_size()
    }
}
