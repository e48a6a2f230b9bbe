//! Executor-specific error types.

use std::time::Duration;

use thiserror::Error;

/// Result type for executor operations.
pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// Errors that can occur while running a compiled report.
#[derive(Error, Debug)]
pub enum ExecuteError {
    /// No pooled connection became available within the checkout timeout.
    #[error("connection pool exhausted: {0}")]
    PoolExhausted(#[source] r2d2::Error),

    /// The pool could not be created or the database could not be opened.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The statement failed to prepare, bind or step.
    #[error("query execution failed: {0}")]
    Execution(#[from] rusqlite::Error),

    /// The statement ran longer than the configured report timeout.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking execution task panicked or was cancelled.
    #[error("execution task failed: {0}")]
    Task(String),
}

impl ExecuteError {
    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::PoolExhausted(_) | Self::Timeout(_))
    }
}

impl From<tokio::task::JoinError> for ExecuteError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
