//! Scalar function library.
//!
//! An allow-list of transforms that may wrap a column in projections and
//! filters. Names are matched case-insensitively. Each entry knows how to
//! build its expression; per-dialect rendering happens in the SQL layer.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::sql::{date_part, date_trunc, func, DatePart, DateTruncUnit, Expr};

/// Function grouping, by the column type it is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCategory {
    Text,
    Numeric,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    /// Plain one-argument SQL function.
    Call(&'static str),
    Part(DatePart),
    Trunc(DateTruncUnit),
}

/// One allow-listed scalar function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarFunction {
    pub name: &'static str,
    pub label: &'static str,
    pub category: FunctionCategory,
    transform: Transform,
}

impl ScalarFunction {
    /// Wrap `expr` in this function.
    pub fn apply(&self, expr: Expr) -> Expr {
        match self.transform {
            Transform::Call(name) => func(name, vec![expr]),
            Transform::Part(part) => date_part(part, expr),
            Transform::Trunc(unit) => date_trunc(unit, expr),
        }
    }
}

const fn entry(
    name: &'static str,
    label: &'static str,
    category: FunctionCategory,
    transform: Transform,
) -> ScalarFunction {
    ScalarFunction {
        name,
        label,
        category,
        transform,
    }
}

/// Every function in display order.
static FUNCTIONS: &[ScalarFunction] = &[
    entry("UPPER", "Uppercase (UPPER)", FunctionCategory::Text, Transform::Call("UPPER")),
    entry("LOWER", "Lowercase (LOWER)", FunctionCategory::Text, Transform::Call("LOWER")),
    entry("LENGTH", "Length (LENGTH)", FunctionCategory::Text, Transform::Call("LENGTH")),
    entry("TRIM", "Trim spaces (TRIM)", FunctionCategory::Text, Transform::Call("TRIM")),
    entry("ABS", "Absolute value (ABS)", FunctionCategory::Numeric, Transform::Call("ABS")),
    entry("ROUND", "Round (ROUND)", FunctionCategory::Numeric, Transform::Call("ROUND")),
    entry("CEIL", "Ceiling (CEIL)", FunctionCategory::Numeric, Transform::Call("CEIL")),
    entry("FLOOR", "Floor (FLOOR)", FunctionCategory::Numeric, Transform::Call("FLOOR")),
    entry("EXTRACT_YEAR", "Extract year", FunctionCategory::Date, Transform::Part(DatePart::Year)),
    entry("EXTRACT_MONTH", "Extract month", FunctionCategory::Date, Transform::Part(DatePart::Month)),
    entry("EXTRACT_DAY", "Extract day", FunctionCategory::Date, Transform::Part(DatePart::Day)),
    entry(
        "DATE_TRUNC_MONTH",
        "Truncate to month",
        FunctionCategory::Date,
        Transform::Trunc(DateTruncUnit::Month),
    ),
    entry(
        "DATE_TRUNC_YEAR",
        "Truncate to year",
        FunctionCategory::Date,
        Transform::Trunc(DateTruncUnit::Year),
    ),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static ScalarFunction>> =
    Lazy::new(|| FUNCTIONS.iter().map(|f| (f.name, f)).collect());

/// Look up a function by name, ignoring case and surrounding whitespace.
pub fn lookup(name: &str) -> Option<&'static ScalarFunction> {
    BY_NAME.get(name.trim().to_ascii_uppercase().as_str()).copied()
}

/// Every allow-listed function, in display order.
pub fn all() -> &'static [ScalarFunction] {
    FUNCTIONS
}

// ============================================================================
// Listing
// ============================================================================

/// One function as shown to a report builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub value: &'static str,
    pub label: &'static str,
}

/// The allow-list grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableFunctions {
    pub text: Vec<FunctionInfo>,
    pub numeric: Vec<FunctionInfo>,
    pub date: Vec<FunctionInfo>,
}

/// List the allow-list grouped by category.
pub fn available_functions() -> AvailableFunctions {
    let group = |category: FunctionCategory| {
        FUNCTIONS
            .iter()
            .filter(|f| f.category == category)
            .map(|f| FunctionInfo {
                value: f.name,
                label: f.label,
            })
            .collect()
    };

    AvailableFunctions {
        text: group(FunctionCategory::Text),
        numeric: group(FunctionCategory::Numeric),
        date: group(FunctionCategory::Date),
    }
}

/// Split `FUNC(inner)` into `("FUNC", "inner")`.
///
/// Returns `None` for anything that is not a single call with an
/// identifier-like name.
pub fn split_call(attribute: &str) -> Option<(&str, &str)> {
    let attribute = attribute.trim();
    let open = attribute.find('(')?;
    let inner = attribute[open + 1..].strip_suffix(')')?;
    let name = attribute[..open].trim();

    let is_ident = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_ident || inner.contains('(') || inner.trim().is_empty() {
        return None;
    }
    Some((name, inner.trim()))
}
