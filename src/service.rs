//! Report service.
//!
//! The single entry point callers use: it owns the catalog store, the
//! executor and the compile options, and exposes every operation the
//! transport layer needs.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::catalog::{CatalogSource, CatalogStore, SqliteCatalogSource, TableSchema};
use crate::config::Settings;
use crate::error::AdhocResult;
use crate::executor::{ConnectionPool, Executor, Row};
use crate::relations::{ForeignKeyRelation, TransitiveRelations};
use crate::report::{
    available_functions, AvailableFunctions, CompileError, CompileOptions, JoinSpec,
    ReportCompiler, ReportRequest,
};
use crate::sql::Dialect;

/// Dialect reports are executed in.
const EXECUTION_DIALECT: Dialect = Dialect::Sqlite;

// ============================================================================
// Response shapes
// ============================================================================

/// Rows produced by a report, with the query that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResponse {
    pub data: Vec<Row>,
    /// Query text with literals inlined, for display.
    pub sql: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A report compiled without running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledReport {
    pub sql: String,
    pub dialect: Dialect,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// A column of a table taking part in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedColumn {
    pub table: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// `table.column`, usable as an attribute reference.
    pub qualified_name: String,
}

// ============================================================================
// Service
// ============================================================================

/// Catalog-backed report compilation and execution.
#[derive(Debug)]
pub struct ReportService {
    store: CatalogStore,
    executor: Executor,
    options: CompileOptions,
    dialect: Dialect,
}

impl ReportService {
    /// Build a service over the database named in `settings`.
    ///
    /// Introspection and report execution share one pool.
    pub fn from_settings(settings: &Settings) -> AdhocResult<Self> {
        settings.validate()?;
        let pool = ConnectionPool::from_settings(&settings.database)?;
        let source = Arc::new(SqliteCatalogSource::new(pool.clone()));
        Self::new(source, pool, settings)
    }

    /// Build a service from explicit parts.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        pool: ConnectionPool,
        settings: &Settings,
    ) -> AdhocResult<Self> {
        let refresh_interval = settings.catalog.refresh_interval()?;
        let timeout = settings.report.timeout()?;

        Ok(Self {
            store: CatalogStore::new(source, refresh_interval),
            executor: Executor::new(pool, timeout),
            options: CompileOptions::from(&settings.report),
            dialect: settings.report.dialect,
        })
    }

    /// Compile and run a report.
    #[instrument(name = "service.generate_report", skip(self, request), fields(base_table = %request.base_table))]
    pub async fn generate_report(&self, request: &ReportRequest) -> AdhocResult<ReportResponse> {
        let snapshot = self.store.snapshot().await?;
        let compiled = ReportCompiler::new(&snapshot.catalog, self.options).compile(request)?;

        let (sql, params) = compiled.to_parameterized(EXECUTION_DIALECT);
        let display_sql = compiled.to_sql(EXECUTION_DIALECT);
        tracing::debug!(sql = %display_sql, params = params.len(), "Compiled report");

        let data = self.executor.fetch(sql, params, compiled.aliases()).await?;
        tracing::debug!(rows = data.len(), "Report executed");

        Ok(ReportResponse {
            data,
            sql: display_sql,
            warnings: compiled.diagnostics.iter().map(ToString::to_string).collect(),
        })
    }

    /// Compile a report to query text without running it.
    ///
    /// Falls back to the configured dialect when none is given.
    #[instrument(name = "service.compile_report", skip(self, request), fields(base_table = %request.base_table))]
    pub async fn compile_report(
        &self,
        request: &ReportRequest,
        dialect: Option<Dialect>,
    ) -> AdhocResult<CompiledReport> {
        let dialect = dialect.unwrap_or(self.dialect);
        let snapshot = self.store.snapshot().await?;
        let compiled = ReportCompiler::new(&snapshot.catalog, self.options).compile(request)?;

        Ok(CompiledReport {
            sql: compiled.to_sql(dialect),
            dialect,
            warnings: compiled.diagnostics.iter().map(ToString::to_string).collect(),
        })
    }

    /// Every user table, by name.
    #[instrument(name = "service.list_tables", skip(self))]
    pub async fn list_tables(&self) -> AdhocResult<Vec<String>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.catalog.table_names().map(String::from).collect())
    }

    /// Columns of `table` in declaration order.
    #[instrument(name = "service.table_columns", skip(self))]
    pub async fn table_columns(&self, table: &str) -> AdhocResult<Vec<ColumnInfo>> {
        let snapshot = self.store.snapshot().await?;
        let schema = require_table(&snapshot.catalog, table)?;

        Ok(schema
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
            })
            .collect())
    }

    /// Tables sharing a foreign key with `table`.
    #[instrument(name = "service.table_relations", skip(self))]
    pub async fn table_relations(&self, table: &str) -> AdhocResult<BTreeSet<String>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.relations.direct_relations(table)?)
    }

    /// Direct and two-hop relations of `table`, skipping `used` tables.
    #[instrument(name = "service.transitive_relations", skip(self, used))]
    pub async fn transitive_relations(
        &self,
        table: &str,
        used: &[String],
    ) -> AdhocResult<TransitiveRelations> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot
            .relations
            .transitive_relations(table, used.iter().map(String::as_str))?)
    }

    /// Relations reachable from `base` together with everything it already joins.
    #[instrument(name = "service.transitive_relations_with_joins", skip(self, joins))]
    pub async fn transitive_relations_with_joins(
        &self,
        base: &str,
        joins: &[JoinSpec],
    ) -> AdhocResult<TransitiveRelations> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.relations.transitive_relations_with_joins(
            base,
            joins.iter().map(|j| j.target_table.as_str()),
        )?)
    }

    /// Columns of `base` and each join target, each table listed once.
    #[instrument(name = "service.joined_tables_columns", skip(self, joins))]
    pub async fn joined_tables_columns(
        &self,
        base: &str,
        joins: &[JoinSpec],
    ) -> AdhocResult<Vec<JoinedColumn>> {
        let snapshot = self.store.snapshot().await?;

        let mut seen = Vec::new();
        let mut columns = Vec::new();
        let names = std::iter::once(base).chain(joins.iter().map(|j| j.target_table.as_str()));
        for name in names {
            let name = name.trim();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            let schema = require_table(&snapshot.catalog, name)?;
            columns.extend(schema.columns.iter().map(|c| JoinedColumn {
                table: schema.name.clone(),
                name: c.name.clone(),
                data_type: c.data_type.clone(),
                qualified_name: format!("{}.{}", schema.name, c.name),
            }));
        }

        Ok(columns)
    }

    /// Foreign-key column pairs between two tables, in either direction.
    #[instrument(name = "service.foreign_key_relations", skip(self))]
    pub async fn foreign_key_relations(
        &self,
        source: &str,
        target: &str,
    ) -> AdhocResult<Vec<ForeignKeyRelation>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.relations.foreign_key_relations(source, target)?)
    }

    /// The scalar function allow-list, grouped by category.
    pub fn available_functions(&self) -> AvailableFunctions {
        available_functions()
    }

    /// Re-introspect the database now.
    #[instrument(name = "service.refresh_catalog", skip(self))]
    pub async fn refresh_catalog(&self) -> AdhocResult<()> {
        self.store.refresh().await?;
        Ok(())
    }
}

fn require_table<'a>(
    catalog: &'a crate::catalog::Catalog,
    table: &str,
) -> Result<&'a TableSchema, CompileError> {
    catalog
        .table(table.trim())
        .ok_or_else(|| CompileError::UnknownTable(table.to_string()))
}
