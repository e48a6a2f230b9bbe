//! Relation graph over a catalog's foreign keys.
//!
//! Tables are nodes and every foreign key is a directed edge from the
//! declaring table to the referenced one. Reachability queries treat the
//! edges as undirected; the direction is kept so column pairs can report
//! which side holds the key.
//!
//! ```text
//!   cities ──state_id──► states ──country_code──► countries
//!                                                    ▲
//!                           borders ──country_code───┘
//! ```
//!
//! The graph is built once per catalog snapshot and never mutated.

pub mod query;
pub mod types;

pub use query::{RelationError, RelationResult};
pub use types::*;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::catalog::{Catalog, ForeignKeyEdge};

/// Directed foreign-key graph of one catalog snapshot.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    /// Nodes are table names; edges point from the declaring table.
    graph: DiGraph<String, ForeignKeyEdge>,

    /// Index: table name → NodeIndex
    node_index: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build the graph for every table and foreign key in `catalog`.
    ///
    /// Keys pointing at tables the catalog does not know are skipped.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut relations = Self::new();

        for name in catalog.table_names() {
            relations.add_table(name);
        }

        for edge in catalog.foreign_keys() {
            let (Some(&from), Some(&to)) = (
                relations.node_index.get(&edge.source_table),
                relations.node_index.get(&edge.target_table),
            ) else {
                tracing::debug!(
                    source = %edge.source_table,
                    target = %edge.target_table,
                    "Skipping foreign key to unknown table"
                );
                continue;
            };
            relations.graph.add_edge(from, to, edge.clone());
        }

        relations
    }

    fn add_table(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.node_index.contains_key(table)
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}
