//! Catalog-specific error types.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while introspecting or reading the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested table does not exist.
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// No connection could be obtained for introspection.
    #[error("catalog connection unavailable: {0}")]
    Connection(#[from] r2d2::Error),

    /// An introspection query failed.
    #[error("catalog introspection failed: {0}")]
    Introspection(#[from] rusqlite::Error),

    /// The blocking introspection task panicked or was cancelled.
    #[error("catalog task failed: {0}")]
    Task(String),
}

impl CatalogError {
    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
