//! Phased topological sort (Kahn's algorithm).

use std::collections::BTreeMap;

use crate::error::PlanError;
use crate::graph::Dag;

/// Partitions the graph into dependency levels.
///
/// Each level is one queue snapshot: all nodes whose blockers are in
/// earlier levels. Ties within a level break by id ascending so the
/// output is deterministic. Any node left unprocessed means a cycle, and
/// the error lists every participant sorted.
pub fn topo_phases(dag: &Dag) -> Result<Vec<Vec<i64>>, PlanError> {
    let mut in_degree: BTreeMap<i64, usize> = dag
        .ids()
        .map(|id| (id, dag.node(id).expect("listed id").upstream.len()))
        .collect();

    // BTreeMap iteration keeps every level sorted by id.
    let mut current: Vec<i64> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    for id in &current {
        in_degree.remove(id);
    }

    let mut levels: Vec<Vec<i64>> = Vec::new();
    while !current.is_empty() {
        let mut next: Vec<i64> = Vec::new();
        for id in &current {
            for downstream in &dag.node(*id).expect("level ids are nodes").downstream {
                let ready = match in_degree.get_mut(downstream) {
                    Some(degree) => {
                        *degree -= 1;
                        *degree == 0
                    }
                    None => false,
                };
                if ready {
                    next.push(*downstream);
                    in_degree.remove(downstream);
                }
            }
        }
        next.sort_unstable();
        levels.push(std::mem::replace(&mut current, next));
    }

    if !in_degree.is_empty() {
        let ids: Vec<i64> = in_degree.into_keys().collect();
        return Err(PlanError::Cycle { ids });
    }

    Ok(levels)
}
