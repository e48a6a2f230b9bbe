//! Ad-hoc report compilation.
//!
//! ```text
//! ReportRequest ──► validate shape ──► TableScope (base + join targets)
//!                                          │
//!        projections ◄── resolve + functions
//!        aggregates  ◄── resolve + COUNT/SUM/AVG/MIN/MAX/COUNT_DISTINCT
//!        joins       ◄── ON source = target
//!        filters     ◄── resolve + functions + operator table
//!        group/order ◄── resolve (order may name an aggregate alias)
//!                                          │
//!                                          ▼
//!                                   CompiledQuery ──► sql::Query
//! ```

pub mod compiler;
pub mod error;
pub mod functions;
pub mod operators;
pub mod request;
pub mod scope;

pub use compiler::{CompileDiagnostic, CompileOptions, CompiledQuery, Projection, ReportCompiler};
pub use error::{CompileError, CompileResult};
pub use functions::{available_functions, AvailableFunctions, FunctionCategory, FunctionInfo};
pub use operators::FilterOperator;
pub use request::{
    AggregateSpec, FilterSpec, JoinKind, JoinSpec, OrderBySpec, OrderDirection, ReportRequest,
};
pub use scope::{AliasAllocator, ResolvedColumn, TableScope};
