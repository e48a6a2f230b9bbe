//! SQL generation module.
//!
//! This module provides a type-safe SQL builder for report queries.
//! It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types, literal and parameterized rendering
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    avg, col, count, count_distinct, count_star, date_part, date_trunc, func, lit_bool,
    lit_float, lit_int, lit_null, lit_str, max, min, star, sum, table_col, BinaryOperator,
    DatePart, DateTruncUnit, Expr, ExprExt, Literal, SortDir,
};
pub use query::{Join, JoinType, OrderByExpr, Query, SelectExpr, TableRef};
pub use token::{BoundValue, Token, TokenStream};
