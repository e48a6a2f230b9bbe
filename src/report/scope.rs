//! Attribute resolution against the tables of one report.
//!
//! A [`TableScope`] is the ordered set of tables a request has brought in:
//! the base table first, then join targets, then any table named by a
//! qualified reference. Unqualified names resolve to the first table in that
//! order that owns the column, so resolution depends on insertion order but
//! is fully deterministic.

use std::collections::HashSet;

use crate::catalog::{Catalog, ColumnSchema};
use crate::sql::{table_col, Expr};

use super::error::{CompileError, CompileResult};

/// A column pinned to its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub table: String,
    pub column: String,
}

impl ResolvedColumn {
    pub fn to_expr(&self) -> Expr {
        table_col(&self.table, &self.column)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// Request-scoped, insertion-ordered set of tables. Never shrinks.
#[derive(Debug, Clone)]
pub struct TableScope<'a> {
    catalog: &'a Catalog,
    tables: Vec<String>,
}

impl<'a> TableScope<'a> {
    /// Start a scope at `base`, which must exist.
    pub fn new(catalog: &'a Catalog, base: &str) -> CompileResult<Self> {
        let mut scope = Self {
            catalog,
            tables: Vec::new(),
        };
        scope.add(base)?;
        Ok(scope)
    }

    pub fn base(&self) -> &str {
        &self.tables[0]
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    /// Bring `table` into scope. Adding a table twice is a no-op.
    pub fn add(&mut self, table: &str) -> CompileResult<()> {
        if !self.catalog.contains_table(table) {
            return Err(CompileError::UnknownTable(table.to_string()));
        }
        if !self.contains(table) {
            self.tables.push(table.to_string());
        }
        Ok(())
    }

    /// Resolve `column` or `table.column`.
    ///
    /// A qualified reference to a catalog table outside the scope brings that
    /// table in; no join is implied.
    pub fn resolve(&mut self, attribute: &str) -> CompileResult<ResolvedColumn> {
        let attribute = attribute.trim();
        if attribute.is_empty() {
            return Err(CompileError::validation("empty attribute reference"));
        }

        if let Some((table, column)) = attribute.split_once('.') {
            let resolved = self.resolve_in(table, column)?;
            self.add(table)?;
            return Ok(resolved);
        }

        let owner = self
            .tables
            .iter()
            .find(|t| self.column_schema(t, attribute).is_some())
            .unwrap_or(&self.tables[0]);

        self.resolve_in(owner, attribute)
    }

    /// Resolve `attribute` with `default_table` standing in for a missing
    /// qualifier.
    pub fn resolve_on(
        &mut self,
        attribute: &str,
        default_table: &str,
    ) -> CompileResult<ResolvedColumn> {
        let attribute = attribute.trim();
        if attribute.contains('.') {
            self.resolve(attribute)
        } else {
            self.resolve_in(default_table, attribute)
        }
    }

    fn resolve_in(&self, table: &str, column: &str) -> CompileResult<ResolvedColumn> {
        let schema = self
            .catalog
            .table(table)
            .ok_or_else(|| CompileError::UnknownTable(table.to_string()))?;

        if !schema.has_column(column) {
            return Err(CompileError::unknown_column(table, column));
        }

        Ok(ResolvedColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    fn column_schema(&self, table: &str, column: &str) -> Option<&'a ColumnSchema> {
        self.catalog.table(table).and_then(|t| t.column(column))
    }
}

/// Hands out unique output aliases.
///
/// The first claim on a bare name keeps it; later claims are suffixed with
/// their table, then with a counter.
#[derive(Debug, Clone, Default)]
pub struct AliasAllocator {
    taken: HashSet<String>,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for a column of `table`.
    pub fn allocate(&mut self, name: &str, table: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }

        let qualified = format!("{}_{}", name, table);
        if self.taken.insert(qualified.clone()) {
            return qualified;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", qualified, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Record an alias chosen by the caller.
    pub fn reserve(&mut self, alias: &str) {
        self.taken.insert(alias.to_string());
    }

    pub fn is_taken(&self, alias: &str) -> bool {
        self.taken.contains(alias)
    }
}
