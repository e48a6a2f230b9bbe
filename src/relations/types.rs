//! Result types for relation queries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ============================================================================
// Foreign-key pairs
// ============================================================================

/// Which way the underlying foreign key points, relative to the two tables
/// a query was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FkDirection {
    /// The first table holds the foreign key.
    SourceToTarget,
    /// The second table holds the foreign key.
    TargetToSource,
}

impl fmt::Display for FkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FkDirection::SourceToTarget => write!(f, "source_to_target"),
            FkDirection::TargetToSource => write!(f, "target_to_source"),
        }
    }
}

/// One column pair linking two tables.
///
/// `source_column` always belongs to the first table of the query and
/// `target_column` to the second, whichever side declares the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRelation {
    pub source_column: String,
    pub target_column: String,
    pub direction: FkDirection,
}

// ============================================================================
// Transitive search
// ============================================================================

/// A two-hop path `source -> intermediate -> target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitivePath {
    /// Table the path starts from.
    pub source: String,
    /// Table both hops pass through.
    pub intermediate: String,
    /// Column pairs between `source` and `intermediate`.
    pub first_hop: Vec<ForeignKeyRelation>,
    /// Column pairs between `intermediate` and the target.
    pub second_hop: Vec<ForeignKeyRelation>,
}

/// Tables reachable from a starting set, split by distance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitiveRelations {
    /// Tables one foreign key away.
    pub direct: BTreeSet<String>,
    /// Tables exactly two foreign keys away, with every path found to them.
    pub transitive: BTreeMap<String, Vec<TransitivePath>>,
}

impl TransitiveRelations {
    /// True when `table` is reachable at either distance.
    pub fn contains(&self, table: &str) -> bool {
        self.direct.contains(table) || self.transitive.contains_key(table)
    }
}
