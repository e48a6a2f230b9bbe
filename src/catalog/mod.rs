//! Schema catalog: tables, columns and foreign keys of the live database.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CatalogStore                           │
//! │   RwLock<Option<Arc<Snapshot>>>   (TTL + explicit refresh)  │
//! │        Snapshot = Arc<Catalog> + Arc<RelationGraph>         │
//! └─────────────────────────────────────────────────────────────┘
//!                           │ snapshot()
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 dyn CatalogSource (async)                   │
//! │   - list_tables()                                           │
//! │   - list_columns(table)                                     │
//! │   - list_foreign_keys(table)                                │
//! └─────────────────────────────────────────────────────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   SqliteCatalogSource                StaticCatalogSource
//!   (pooled rusqlite, pragmas)         (fixed in-memory catalog)
//! ```

mod error;
mod source;
mod sqlite;
mod store;
mod types;

pub use error::{CatalogError, CatalogResult};
pub use source::{CatalogSource, StaticCatalogSource};
pub use sqlite::SqliteCatalogSource;
pub use store::{CatalogStore, Snapshot};
pub use types::{Catalog, ColumnSchema, ForeignKeyEdge, SemanticType, TableSchema};
