//! # Adhoc
//!
//! Ad-hoc reports over a live SQLite database, driven by its foreign keys.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 ReportRequest (JSON)                     │
//! │  (base table, attributes, joins, filters, aggregates)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [service]
//! ┌─────────────────────────────────────────────────────────┐
//! │         Catalog snapshot (tables, columns, FKs)          │
//! │         + RelationGraph (direct / two-hop joins)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │     CompiledQuery (projections, joins, predicates)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql + executor]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Parameterized SQL ──► pooled connection           │
//! │        rows keyed by output alias + display SQL          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod relations;
pub mod report;
pub mod service;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{
        Catalog, CatalogSource, CatalogStore, ColumnSchema, ForeignKeyEdge, SemanticType,
        SqliteCatalogSource, StaticCatalogSource, TableSchema,
    };
    pub use crate::config::Settings;
    pub use crate::error::{AdhocError, AdhocResult, ErrorKind, ErrorPayload};
    pub use crate::executor::{ConnectionPool, Executor, Row};
    pub use crate::relations::{
        FkDirection, ForeignKeyRelation, RelationGraph, TransitivePath, TransitiveRelations,
    };
    pub use crate::report::{
        AggregateSpec, CompileOptions, CompiledQuery, FilterSpec, JoinKind, JoinSpec,
        OrderBySpec, OrderDirection, ReportCompiler, ReportRequest,
    };
    pub use crate::service::{ColumnInfo, CompiledReport, JoinedColumn, ReportResponse, ReportService};
    pub use crate::sql::{Dialect, SqlDialect};
}

pub use error::{AdhocError, AdhocResult};
pub use service::ReportService;
