//! The canonical blocker DAG.
//!
//! Every edge `A -> B` means "A must be done before B": `blocks(A, B)`
//! maps to `A -> B` and `depends_on(A, B)` maps to `B -> A`. The other
//! relation types do not participate. Each node carries both edge
//! directions for O(1) lookup either way.

use std::collections::BTreeMap;

use docket_core::entity::Relation;
use docket_core::enums::RelationType;

/// One node of the [`Dag`].
#[derive(Debug, Clone, Default)]
pub struct DagNode {
    /// Issues this node blocks (must be done before them).
    pub downstream: Vec<i64>,
    /// Blockers of this node (must be done before it).
    pub upstream: Vec<i64>,
}

/// The normalized dependency graph over a set of issues.
///
/// Edges whose endpoints are not both in the node set are dropped, which
/// is what scopes a plan to a sub-tree.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    nodes: BTreeMap<i64, DagNode>,
}

impl Dag {
    /// Builds the graph from issue ids and directional relations.
    pub fn build(issue_ids: impl IntoIterator<Item = i64>, relations: &[Relation]) -> Self {
        let mut nodes: BTreeMap<i64, DagNode> = issue_ids
            .into_iter()
            .map(|id| (id, DagNode::default()))
            .collect();

        for relation in relations {
            let (blocker, blocked) = match relation.relation_type {
                RelationType::Blocks => (relation.source_id.raw(), relation.target_id.raw()),
                RelationType::DependsOn => (relation.target_id.raw(), relation.source_id.raw()),
                _ => continue,
            };
            if !nodes.contains_key(&blocker) || !nodes.contains_key(&blocked) {
                continue;
            }
            let node = nodes.get_mut(&blocker).expect("checked above");
            if !node.downstream.contains(&blocked) {
                node.downstream.push(blocked);
            }
            let node = nodes.get_mut(&blocked).expect("checked above");
            if !node.upstream.contains(&blocker) {
                node.upstream.push(blocker);
            }
        }

        Self { nodes }
    }

    /// Returns the node for an id, if present.
    pub fn node(&self, id: i64) -> Option<&DagNode> {
        self.nodes.get(&id)
    }

    /// Returns `true` if the id is part of the graph.
    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterates node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
