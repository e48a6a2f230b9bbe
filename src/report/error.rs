//! Report compilation errors.

use thiserror::Error;

use crate::relations::RelationError;

/// Result type for report compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that reject a report request before any SQL runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The base table or a join target is not in the catalog.
    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    /// The column is not present on the table it resolved to.
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Aggregate function outside COUNT, SUM, AVG, MIN, MAX, COUNT_DISTINCT.
    #[error("unsupported aggregate function '{0}'")]
    UnsupportedFunction(String),

    /// Filter operator outside the supported set.
    #[error("unsupported filter operator '{0}'")]
    UnsupportedOperator(String),

    /// The request is malformed.
    #[error("invalid report request: {0}")]
    Validation(String),
}

impl CompileError {
    pub fn unknown_column(table: &str, column: &str) -> Self {
        Self::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RelationError> for CompileError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::UnknownTable(table) => Self::UnknownTable(table),
        }
    }
}
