//! CatalogSource trait definition.
//!
//! A `CatalogSource` answers the three introspection questions the relation
//! graph and the compiler need: which tables exist, what columns a table
//! has, and which foreign keys leave it.

use async_trait::async_trait;
use futures::future::try_join_all;

use super::error::CatalogResult;
use super::types::{Catalog, ColumnSchema, ForeignKeyEdge, TableSchema};

/// Trait for introspecting a live database.
///
/// Implementations must report an unknown table as
/// [`CatalogError::TableNotFound`](super::CatalogError::TableNotFound),
/// never as an empty success.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List every user table.
    async fn list_tables(&self) -> CatalogResult<Vec<String>>;

    /// List the columns of a table in declaration order.
    async fn list_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSchema>>;

    /// List the foreign keys declared on a table.
    async fn list_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyEdge>>;

    // =========================================================================
    // Batch operations (default implementations using parallel fetches)
    // =========================================================================

    /// Fetch columns and foreign keys for one table.
    async fn load_table(&self, table: &str) -> CatalogResult<TableSchema> {
        let (columns, foreign_keys) =
            futures::try_join!(self.list_columns(table), self.list_foreign_keys(table))?;

        Ok(TableSchema {
            name: table.to_string(),
            columns,
            foreign_keys,
        })
    }

    /// Introspect every table into a catalog snapshot.
    ///
    /// Default implementation lists tables first, then loads them in parallel.
    async fn snapshot(&self) -> CatalogResult<Catalog> {
        let names = self.list_tables().await?;
        let tables = try_join_all(names.iter().map(|name| self.load_table(name))).await?;
        Ok(Catalog::from_tables(tables))
    }
}

/// A fixed, in-memory catalog source.
///
/// Serves a pre-built [`Catalog`]; useful for compile-only tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    catalog: Catalog,
}

impl StaticCatalogSource {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    fn require(&self, table: &str) -> CatalogResult<&TableSchema> {
        self.catalog
            .table(table)
            .ok_or_else(|| super::CatalogError::TableNotFound(table.to_string()))
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        Ok(self.catalog.table_names().map(String::from).collect())
    }

    async fn list_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSchema>> {
        Ok(self.require(table)?.columns.clone())
    }

    async fn list_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyEdge>> {
        Ok(self.require(table)?.foreign_keys.clone())
    }

    async fn snapshot(&self) -> CatalogResult<Catalog> {
        Ok(self.catalog.clone())
    }
}
