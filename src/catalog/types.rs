//! Catalog data types: tables, columns and foreign-key edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse type class derived from a column's declared type.
///
/// Used to group columns for display and to pick sensible functions; the
/// declared type string is always kept alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    Numeric,
    Date,
    Boolean,
    Other,
}

impl SemanticType {
    /// Classify a declared SQL type (`VARCHAR(50)`, `INTEGER`, `timestamp`, ...).
    ///
    /// Matching is by substring on the upper-cased name, following SQLite's
    /// affinity rules loosely so both SQLite and PostgreSQL names classify.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();

        if upper.contains("BOOL") {
            SemanticType::Boolean
        } else if upper.contains("DATE") || upper.contains("TIME") {
            SemanticType::Date
        } else if upper.contains("CHAR") || upper.contains("TEXT") || upper.contains("CLOB") {
            SemanticType::Text
        } else if upper.contains("INT")
            || upper.contains("REAL")
            || upper.contains("FLOA")
            || upper.contains("DOUB")
            || upper.contains("NUMERIC")
            || upper.contains("DECIMAL")
        {
            SemanticType::Numeric
        } else {
            SemanticType::Other
        }
    }
}

/// A column as introspected from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub name: String,
    /// Declared type as reported by the database.
    #[serde(rename = "type")]
    pub data_type: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let data_type = data_type.into();
        Self {
            name: name.into(),
            semantic_type: SemanticType::from_declared(&data_type),
            data_type,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A foreign key: `(source_table, source_column) -> (target_table, target_column)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyEdge {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl ForeignKeyEdge {
    pub fn new(
        source_table: impl Into<String>,
        source_column: impl Into<String>,
        target_table: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            source_column: source_column.into(),
            target_table: target_table.into(),
            target_column: target_column.into(),
        }
    }
}

/// A table with its ordered columns and outgoing foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub foreign_keys: Vec<ForeignKeyEdge>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Add an outgoing foreign key from `column` to `target_table.target_column`.
    pub fn with_foreign_key(mut self, column: &str, target_table: &str, target_column: &str) -> Self {
        let edge = ForeignKeyEdge::new(self.name.clone(), column, target_table, target_column);
        self.foreign_keys.push(edge);
        self
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// Immutable snapshot of every table in the database.
///
/// Tables are keyed by name and iterate in name order, so every listing
/// derived from a catalog is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from introspected tables. Later duplicates win.
    pub fn from_tables(tables: impl IntoIterator<Item = TableSchema>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in name order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Every foreign-key edge in the catalog.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKeyEdge> {
        self.tables.values().flat_map(|t| t.foreign_keys.iter())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
