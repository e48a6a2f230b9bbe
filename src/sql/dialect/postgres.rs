//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - `ILIKE` for case-insensitive pattern matching
//! - `EXTRACT(... FROM ...)` and `DATE_TRUNC` for date handling
//! - `$n` bind parameters

use super::helpers;
use super::SqlDialect;
use crate::sql::expr::{DatePart, DateTruncUnit};
use crate::sql::token::TokenStream;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, index: usize) -> String {
        helpers::placeholder_dollar(index)
    }

    // Uses default emit_limit (LIMIT n)

    fn supports_ilike(&self) -> bool {
        true
    }

    fn emit_date_part(&self, part: DatePart, operand: TokenStream) -> TokenStream {
        helpers::emit_date_part_extract(part, operand)
    }

    fn emit_date_trunc(&self, unit: DateTruncUnit, operand: TokenStream) -> TokenStream {
        helpers::emit_date_trunc_function(unit, operand)
    }
}
