//! Planner error types.

/// Errors produced while building or sorting the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The graph contains at least one cycle; `ids` lists every
    /// participating issue, sorted ascending.
    #[error("dependency graph contains a cycle involving: {}", format_ids(.ids))]
    Cycle {
        /// Internal ids of all issues left unsorted by the topological pass.
        ids: Vec<i64>,
    },

    /// The requested plan root is not among the supplied issues.
    #[error("root issue {} not found", format_id(.0))]
    UnknownRoot(i64),
}

fn format_id(id: &i64) -> String {
    format!("{}-{id}", docket_core::id::ID_PREFIX)
}

fn format_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| format_id(id)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_lists_all_ids() {
        let err = PlanError::Cycle { ids: vec![1, 2, 3] };
        assert_eq!(
            err.to_string(),
            "dependency graph contains a cycle involving: DKT-1, DKT-2, DKT-3"
        );
    }
}
