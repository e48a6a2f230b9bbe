//! Query interface for the relation graph.
//!
//! - Direct relations: tables one foreign key away, in either direction
//! - Transitive relations: tables exactly two foreign keys away
//! - Foreign-key pairs: the column pairs linking two tables

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::graph::NodeIndex;
use thiserror::Error;

use super::{FkDirection, ForeignKeyRelation, RelationGraph, TransitivePath, TransitiveRelations};

/// Errors that can occur during relation queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelationError {
    #[error("table '{0}' does not exist")]
    UnknownTable(String),
}

/// Result type for relation queries.
pub type RelationResult<T> = Result<T, RelationError>;

impl RelationGraph {
    fn node(&self, table: &str) -> RelationResult<NodeIndex> {
        self.node_index
            .get(table)
            .copied()
            .ok_or_else(|| RelationError::UnknownTable(table.to_string()))
    }

    /// Tables with a foreign key to or from `table`.
    ///
    /// A self-referencing key makes the table its own relation.
    pub fn direct_relations(&self, table: &str) -> RelationResult<BTreeSet<String>> {
        let idx = self.node(table)?;
        Ok(self
            .graph
            .neighbors_undirected(idx)
            .map(|n| self.graph[n].clone())
            .collect())
    }

    /// Column pairs linking `source` and `target`, keys declared on either side.
    ///
    /// Returns an empty list when the tables are not related.
    pub fn foreign_key_relations(
        &self,
        source: &str,
        target: &str,
    ) -> RelationResult<Vec<ForeignKeyRelation>> {
        let a = self.node(source)?;
        let b = self.node(target)?;
        Ok(self.fk_pairs(a, b))
    }

    fn fk_pairs(&self, a: NodeIndex, b: NodeIndex) -> Vec<ForeignKeyRelation> {
        let mut pairs: Vec<ForeignKeyRelation> = self
            .graph
            .edges_connecting(a, b)
            .map(|edge| ForeignKeyRelation {
                source_column: edge.weight().source_column.clone(),
                target_column: edge.weight().target_column.clone(),
                direction: FkDirection::SourceToTarget,
            })
            .collect();

        // A self-reference would otherwise be listed twice
        if a != b {
            pairs.extend(self.graph.edges_connecting(b, a).map(|edge| ForeignKeyRelation {
                source_column: edge.weight().target_column.clone(),
                target_column: edge.weight().source_column.clone(),
                direction: FkDirection::TargetToSource,
            }));
        }

        pairs
    }

    /// Direct and two-hop relations of `source`, ignoring `used` tables.
    ///
    /// Neither `source` nor any `used` table appears in the result, and a
    /// table reachable directly is never listed as transitive. Names in
    /// `used` that the graph does not know are ignored.
    pub fn transitive_relations<'a>(
        &self,
        source: &str,
        used: impl IntoIterator<Item = &'a str>,
    ) -> RelationResult<TransitiveRelations> {
        let start = self.node(source)?;

        let mut excluded: HashSet<NodeIndex> = used
            .into_iter()
            .filter_map(|name| self.node_index.get(name).copied())
            .collect();
        excluded.insert(start);

        let direct = self.direct_nodes(&[start], &excluded);
        let transitive = self.two_hop_paths(&[start], &excluded, &direct);

        Ok(self.collect_relations(direct, transitive))
    }

    /// Direct and two-hop relations of a table joined with `joined` tables.
    ///
    /// Every involved table contributes its direct relations, and the
    /// two-hop search starts from each of them. Involved tables never appear
    /// in the result.
    pub fn transitive_relations_with_joins<'a>(
        &self,
        base: &str,
        joined: impl IntoIterator<Item = &'a str>,
    ) -> RelationResult<TransitiveRelations> {
        let mut involved = vec![self.node(base)?];
        for name in joined {
            let idx = self.node(name)?;
            if !involved.contains(&idx) {
                involved.push(idx);
            }
        }

        let excluded: HashSet<NodeIndex> = involved.iter().copied().collect();
        let direct = self.direct_nodes(&involved, &excluded);
        let transitive = self.two_hop_paths(&involved, &excluded, &direct);

        Ok(self.collect_relations(direct, transitive))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn direct_nodes(&self, from: &[NodeIndex], excluded: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let mut direct = Vec::new();
        for &idx in from {
            for n in self.graph.neighbors_undirected(idx) {
                if !excluded.contains(&n) && !direct.contains(&n) {
                    direct.push(n);
                }
            }
        }
        direct
    }

    fn two_hop_paths(
        &self,
        starts: &[NodeIndex],
        excluded: &HashSet<NodeIndex>,
        direct: &[NodeIndex],
    ) -> Vec<(NodeIndex, TransitivePath)> {
        let mut paths = Vec::new();

        for &start in starts {
            let mids: BTreeSet<NodeIndex> = self
                .graph
                .neighbors_undirected(start)
                .filter(|n| !excluded.contains(n))
                .collect();

            for &mid in &mids {
                let first_hop = self.fk_pairs(start, mid);
                if first_hop.is_empty() {
                    continue;
                }

                let targets: BTreeSet<NodeIndex> = self
                    .graph
                    .neighbors_undirected(mid)
                    .filter(|t| *t != start && !excluded.contains(t) && !direct.contains(t))
                    .collect();

                for target in targets {
                    let second_hop = self.fk_pairs(mid, target);
                    if second_hop.is_empty() {
                        continue;
                    }
                    paths.push((
                        target,
                        TransitivePath {
                            source: self.graph[start].clone(),
                            intermediate: self.graph[mid].clone(),
                            first_hop: first_hop.clone(),
                            second_hop,
                        },
                    ));
                }
            }
        }

        paths
    }

    fn collect_relations(
        &self,
        direct: Vec<NodeIndex>,
        paths: Vec<(NodeIndex, TransitivePath)>,
    ) -> TransitiveRelations {
        let mut transitive: BTreeMap<String, Vec<TransitivePath>> = BTreeMap::new();
        for (target, path) in paths {
            transitive
                .entry(self.graph[target].clone())
                .or_default()
                .push(path);
        }

        TransitiveRelations {
            direct: direct.into_iter().map(|n| self.graph[n].clone()).collect(),
            transitive,
        }
    }
}
