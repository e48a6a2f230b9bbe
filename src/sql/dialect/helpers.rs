//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::expr::{DatePart, DateTruncUnit};
use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: SQLite (no native boolean storage class)
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Bind Parameters
// =============================================================================

/// Positional `$n` placeholder (1-based).
/// Used by: Postgres
pub fn placeholder_dollar(index: usize) -> String {
    format!("${}", index)
}

/// Numbered `?n` placeholder (1-based).
/// Used by: SQLite
pub fn placeholder_question(index: usize) -> String {
    format!("?{}", index)
}

// =============================================================================
// Date Functions
// =============================================================================

/// `EXTRACT(YEAR FROM expr)` (standard SQL).
/// Used by: Postgres
pub fn emit_date_part_extract(part: DatePart, operand: TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("EXTRACT".into()))
        .lparen()
        .push(Token::Raw(part.keyword().into()))
        .space()
        .push(Token::From)
        .space()
        .append(&operand)
        .rparen();
    ts
}

/// `DATE_TRUNC('month', expr)`.
/// Used by: Postgres
pub fn emit_date_trunc_function(unit: DateTruncUnit, operand: TokenStream) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("DATE_TRUNC".into()))
        .lparen()
        .push(Token::StaticString(unit.name()))
        .comma()
        .space()
        .append(&operand)
        .rparen();
    ts
}

/// `CAST(STRFTIME('%Y', expr) AS INTEGER)`.
/// Used by: SQLite
pub fn emit_date_part_strftime(part: DatePart, operand: TokenStream) -> TokenStream {
    let format = match part {
        DatePart::Year => "%Y",
        DatePart::Month => "%m",
        DatePart::Day => "%d",
    };

    let mut ts = TokenStream::new();
    ts.push(Token::Cast)
        .lparen()
        .push(Token::FunctionName("STRFTIME".into()))
        .lparen()
        .push(Token::StaticString(format))
        .comma()
        .space()
        .append(&operand)
        .rparen()
        .space()
        .push(Token::As)
        .space()
        .push(Token::Raw("INTEGER".into()))
        .rparen();
    ts
}

/// `DATE(expr, 'start of month')`.
/// Used by: SQLite
pub fn emit_date_trunc_modifier(unit: DateTruncUnit, operand: TokenStream) -> TokenStream {
    let modifier = match unit {
        DateTruncUnit::Month => "start of month",
        DateTruncUnit::Year => "start of year",
    };

    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName("DATE".into()))
        .lparen()
        .append(&operand)
        .comma()
        .space()
        .push(Token::StaticString(modifier))
        .rparen();
    ts
}
