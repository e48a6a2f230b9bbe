//! Crate-level error type.
//!
//! Every module keeps its own `thiserror` enum; [`AdhocError`] unifies them
//! for the service surface and classifies each into an [`ErrorKind`] that
//! callers map onto their transport.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::SettingsError;
use crate::executor::ExecuteError;
use crate::relations::RelationError;
use crate::report::CompileError;

/// Result type for service operations.
pub type AdhocResult<T> = Result<T, AdhocError>;

/// Any error the service can return.
#[derive(Error, Debug)]
pub enum AdhocError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Config(#[from] SettingsError),

    /// The request body is not a valid report request.
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] serde_json::Error),
}

/// Stable classification of an [`AdhocError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UnknownTable,
    UnknownColumn,
    UnsupportedFunction,
    UnsupportedOperator,
    Validation,
    PoolExhausted,
    Connection,
    Execution,
    Timeout,
    Catalog,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl AdhocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdhocError::Compile(e) => match e {
                CompileError::UnknownTable(_) => ErrorKind::UnknownTable,
                CompileError::UnknownColumn { .. } => ErrorKind::UnknownColumn,
                CompileError::UnsupportedFunction(_) => ErrorKind::UnsupportedFunction,
                CompileError::UnsupportedOperator(_) => ErrorKind::UnsupportedOperator,
                CompileError::Validation(_) => ErrorKind::Validation,
            },
            AdhocError::Catalog(e) => match e {
                CatalogError::TableNotFound(_) => ErrorKind::UnknownTable,
                _ => ErrorKind::Catalog,
            },
            AdhocError::Execute(e) => match e {
                ExecuteError::PoolExhausted(_) => ErrorKind::PoolExhausted,
                ExecuteError::Connection(_) => ErrorKind::Connection,
                ExecuteError::Timeout(_) => ErrorKind::Timeout,
                ExecuteError::Execution(_) | ExecuteError::Task(_) => ErrorKind::Execution,
            },
            AdhocError::Config(_) => ErrorKind::Config,
            AdhocError::MalformedRequest(_) => ErrorKind::Validation,
        }
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        match self {
            AdhocError::Catalog(e) => e.is_retriable(),
            AdhocError::Execute(e) => e.is_retriable(),
            _ => false,
        }
    }

    /// Build the serializable payload for this error.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload::from(self)
    }
}

impl From<RelationError> for AdhocError {
    fn from(err: RelationError) -> Self {
        Self::Compile(err.into())
    }
}

/// `{kind, message, causes}` as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    /// Messages of the underlying sources, outermost first.
    pub causes: Vec<String>,
}

impl From<&AdhocError> for ErrorPayload {
    fn from(err: &AdhocError) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: err.kind(),
            message: err.to_string(),
            causes,
        }
    }
}
