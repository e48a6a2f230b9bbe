//! SqliteCatalogSource implementation.
//!
//! Introspects a SQLite database through `sqlite_master` and the
//! `pragma_table_info` / `pragma_foreign_key_list` table-valued functions.
//! Every call checks out its own pooled connection on the blocking pool.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::error::{CatalogError, CatalogResult};
use super::source::CatalogSource;
use super::types::{ColumnSchema, ForeignKeyEdge};
use crate::executor::ConnectionPool;

/// CatalogSource backed by a live SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCatalogSource {
    pool: ConnectionPool,
}

impl SqliteCatalogSource {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn with_connection<T, F>(&self, f: F) -> CatalogResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> CatalogResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalogSource {
    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name",
            )?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
        .await
    }

    async fn list_columns(&self, table: &str) -> CatalogResult<Vec<ColumnSchema>> {
        let table = table.to_string();
        self.with_connection(move |conn| {
            require_table(conn, &table)?;
            read_columns(conn, &table)
        })
        .await
    }

    async fn list_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyEdge>> {
        let table = table.to_string();
        self.with_connection(move |conn| {
            require_table(conn, &table)?;

            let mut stmt = conn.prepare(
                "SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) \
                 ORDER BY id, seq",
            )?;
            let raw = stmt
                .query_map([&table], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut edges = Vec::with_capacity(raw.len());
            for (target_table, source_column, target_column) in raw {
                // `REFERENCES t` without a column list points at t's primary key
                let target_column = match target_column {
                    Some(column) => column,
                    None => match primary_key_column(conn, &target_table)? {
                        Some(column) => column,
                        None => {
                            tracing::warn!(
                                table = %table,
                                target = %target_table,
                                "Skipping foreign key to a table without a primary key"
                            );
                            continue;
                        }
                    },
                };
                edges.push(ForeignKeyEdge::new(
                    table.as_str(),
                    source_column,
                    target_table,
                    target_column,
                ));
            }
            Ok(edges)
        })
        .await
    }
}

fn require_table(conn: &Connection, table: &str) -> CatalogResult<()> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |_| Ok(()),
        )
        .optional()?;

    found.ok_or_else(|| CatalogError::TableNotFound(table.to_string()))
}

fn read_columns(conn: &Connection, table: &str) -> CatalogResult<Vec<ColumnSchema>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table], |row| {
            let name: String = row.get(0)?;
            let declared: String = row.get(1)?;
            let not_null: bool = row.get(2)?;
            let pk: i64 = row.get(3)?;

            let mut column = ColumnSchema::new(name, declared);
            if not_null {
                column = column.not_null();
            }
            if pk > 0 {
                column = column.primary_key();
            }
            Ok(column)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn primary_key_column(conn: &Connection, table: &str) -> CatalogResult<Option<String>> {
    let column = conn
        .query_row(
            "SELECT name FROM pragma_table_info(?1) WHERE pk = 1",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(column)
}
