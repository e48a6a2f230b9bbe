//! Filter operators and predicate construction.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::sql::{lit_bool, lit_float, lit_int, lit_null, lit_str, Expr, ExprExt};

use super::error::{CompileError, CompileResult};

/// The twelve supported comparison kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    ILike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

static OPERATORS: Lazy<HashMap<&'static str, FilterOperator>> = Lazy::new(|| {
    HashMap::from([
        ("=", FilterOperator::Eq),
        ("!=", FilterOperator::Ne),
        ("<>", FilterOperator::Ne),
        (">", FilterOperator::Gt),
        ("<", FilterOperator::Lt),
        (">=", FilterOperator::Gte),
        ("<=", FilterOperator::Lte),
        ("LIKE", FilterOperator::Like),
        ("ILIKE", FilterOperator::ILike),
        ("IN", FilterOperator::In),
        ("NOT IN", FilterOperator::NotIn),
        ("IS NULL", FilterOperator::IsNull),
        ("IS NOT NULL", FilterOperator::IsNotNull),
    ])
});

impl FilterOperator {
    /// Parse an operator, ignoring case and extra whitespace.
    pub fn parse(raw: &str) -> CompileResult<Self> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        OPERATORS
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| CompileError::UnsupportedOperator(raw.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Gte => ">=",
            FilterOperator::Lte => "<=",
            FilterOperator::Like => "LIKE",
            FilterOperator::ILike => "ILIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Build `column <op> value`.
    ///
    /// Equality against JSON null becomes `IS [NOT] NULL`; the null checks
    /// ignore `value` altogether.
    pub fn predicate(self, column: Expr, value: &Value, attribute: &str) -> CompileResult<Expr> {
        let expr = match self {
            FilterOperator::Eq if value.is_null() => column.is_null(),
            FilterOperator::Ne if value.is_null() => column.is_not_null(),
            FilterOperator::Eq => column.eq(scalar(value, attribute)?),
            FilterOperator::Ne => column.ne(scalar(value, attribute)?),
            FilterOperator::Gt => column.gt(scalar(value, attribute)?),
            FilterOperator::Lt => column.lt(scalar(value, attribute)?),
            FilterOperator::Gte => column.gte(scalar(value, attribute)?),
            FilterOperator::Lte => column.lte(scalar(value, attribute)?),
            FilterOperator::Like => column.like(scalar(value, attribute)?),
            FilterOperator::ILike => column.ilike(scalar(value, attribute)?),
            FilterOperator::In => column.in_list(list(value, attribute)?),
            FilterOperator::NotIn => column.not_in_list(list(value, attribute)?),
            FilterOperator::IsNull => column.is_null(),
            FilterOperator::IsNotNull => column.is_not_null(),
        };
        Ok(expr)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a JSON scalar into a literal.
fn scalar(value: &Value, attribute: &str) -> CompileResult<Expr> {
    match value {
        Value::Null => Ok(lit_null()),
        Value::Bool(b) => Ok(lit_bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(lit_int(i)),
            None => n.as_f64().map(lit_float).ok_or_else(|| {
                CompileError::validation(format!("filter on '{}' has an invalid number", attribute))
            }),
        },
        Value::String(s) => Ok(lit_str(s)),
        Value::Array(_) | Value::Object(_) => Err(CompileError::validation(format!(
            "filter on '{}' expects a single value",
            attribute
        ))),
    }
}

/// Convert an IN operand: a JSON list, or a comma-separated string whose
/// items are trimmed and whose empty items are dropped.
fn list(value: &Value, attribute: &str) -> CompileResult<Vec<Expr>> {
    match value {
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(lit_str)
            .collect()),
        Value::Array(items) => items.iter().map(|item| scalar(item, attribute)).collect(),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![scalar(other, attribute)?]),
    }
}
