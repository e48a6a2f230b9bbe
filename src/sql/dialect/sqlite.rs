//! SQLite SQL dialect.
//!
//! SQLite is the execution engine behind the report executor:
//! - ANSI identifier quoting (`"`)
//! - Booleans stored as integers (1/0)
//! - No `ILIKE`; emulated with `LOWER(x) LIKE LOWER(p)`. Connections are
//!   opened with `case_sensitive_like` so plain `LIKE` matches PostgreSQL.
//! - Date parts via `STRFTIME`, truncation via `DATE(x, 'start of ...')`
//! - `?n` bind parameters

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::{DatePart, DateTruncUnit};
use crate::sql::token::TokenStream;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_question(index)
    }

    fn emit_date_part(&self, part: DatePart, operand: TokenStream) -> TokenStream {
        helpers::emit_date_part_strftime(part, operand)
    }

    fn emit_date_trunc(&self, unit: DateTruncUnit, operand: TokenStream) -> TokenStream {
        helpers::emit_date_trunc_modifier(unit, operand)
    }
}
