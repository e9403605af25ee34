//! Scoped BFS traversal for graph views.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use serde::Serialize;

use crate::graph::Dag;

/// Which way to walk from the starting issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Downstream: issues this one blocks.
    Forward,
    /// Upstream: blockers of this one.
    Backward,
    /// Both at once.
    Both,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "down" | "forward" => Ok(Self::Forward),
            "up" | "backward" => Ok(Self::Backward),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "invalid direction {other:?} (expected up, down, or both)"
            )),
        }
    }
}

/// One visited node with its BFS depth from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub issue_id: i64,
    pub depth: usize,
}

/// BFS from `start` up to `max_depth` hops (0 = unlimited).
///
/// The start node is included at depth 0. Visit order is breadth-first
/// with neighbors in edge insertion order; each node appears once at its
/// shortest depth.
pub fn traverse(dag: &Dag, start: i64, direction: Direction, max_depth: usize) -> Vec<GraphNode> {
    let mut result = Vec::new();
    if !dag.contains(start) {
        return result;
    }

    let mut visited: HashSet<i64> = HashSet::new();
    let mut queue: VecDeque<(i64, usize)> = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        result.push(GraphNode {
            issue_id: current,
            depth,
        });
        if max_depth > 0 && depth >= max_depth {
            continue;
        }

        let node = dag.node(current).expect("visited ids are nodes");
        let neighbors: Vec<i64> = match direction {
            Direction::Forward => node.downstream.clone(),
            Direction::Backward => node.upstream.clone(),
            Direction::Both => {
                let mut all = node.downstream.clone();
                all.extend(&node.upstream);
                all
            }
        };
        for next in neighbors {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    result
}
