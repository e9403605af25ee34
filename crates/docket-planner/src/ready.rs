//! Work-ready discovery.

use std::collections::{HashMap, HashSet};

use docket_core::entity::Relation;
use docket_core::enums::Status;
use docket_core::id::IssueId;
use docket_core::issue::Issue;

use crate::graph::Dag;

/// Statuses eligible for ready work when the caller does not override.
pub const DEFAULT_READY_STATUSES: &[Status] = &[Status::Backlog, Status::Todo];

/// Returns the issues that are ready to start: leaves of the parent tree,
/// status in `allowed`, and every blocker done. Sorted by priority rank,
/// then id.
pub fn find_ready(issues: &[Issue], relations: &[Relation], allowed: &[Status]) -> Vec<Issue> {
    let dag = Dag::build(issues.iter().map(|i| i.id.raw()), relations);
    let status_of: HashMap<i64, Status> =
        issues.iter().map(|i| (i.id.raw(), i.status)).collect();
    let parents: HashSet<i64> = issues
        .iter()
        .filter_map(|i| i.parent_id.map(IssueId::raw))
        .collect();

    let mut ready: Vec<Issue> = issues
        .iter()
        .filter(|issue| !parents.contains(&issue.id.raw()))
        .filter(|issue| allowed.contains(&issue.status))
        .filter(|issue| {
            dag.node(issue.id.raw())
                .map(|node| {
                    node.upstream
                        .iter()
                        .all(|blocker| status_of.get(blocker) == Some(&Status::Done))
                })
                .unwrap_or(true)
        })
        .cloned()
        .collect();

    ready.sort_by_key(|issue| (issue.priority.rank(), issue.id.raw()));
    ready
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::enums::{Priority, RelationType};
    use docket_core::issue::IssueBuilder;
    use docket_core::time;

    fn issue(id: i64, status: Status) -> Issue {
        IssueBuilder::new(format!("issue {id}"))
            .id(IssueId::new(id).unwrap())
            .status(status)
            .build()
    }

    fn blocks(source: i64, target: i64) -> Relation {
        Relation {
            id: 0,
            source_id: IssueId::new(source).unwrap(),
            target_id: IssueId::new(target).unwrap(),
            relation_type: RelationType::Blocks,
            created_at: time::now(),
        }
    }

    #[test]
    fn blocked_issue_is_not_ready() {
        let issues = vec![issue(1, Status::Todo), issue(2, Status::Todo)];
        let relations = vec![blocks(1, 2)];

        let ready = find_ready(&issues, &relations, DEFAULT_READY_STATUSES);
        let ids: Vec<i64> = ready.iter().map(|i| i.id.raw()).collect();
        assert_eq!(ids, vec![1], "2 waits for its blocker");
    }

    #[test]
    fn done_blocker_unblocks() {
        let issues = vec![issue(1, Status::Done), issue(2, Status::Todo)];
        let relations = vec![blocks(1, 2)];

        let ready = find_ready(&issues, &relations, DEFAULT_READY_STATUSES);
        let ids: Vec<i64> = ready.iter().map(|i| i.id.raw()).collect();
        // 1 itself is done and so not in the allowed set.
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn parents_are_not_leaves() {
        let parent = issue(1, Status::Todo);
        let mut child = issue(2, Status::Todo);
        child.parent_id = Some(IssueId::new(1).unwrap());

        let ready = find_ready(&[parent, child], &[], DEFAULT_READY_STATUSES);
        let ids: Vec<i64> = ready.iter().map(|i| i.id.raw()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn status_gate_applies() {
        let issues = vec![issue(1, Status::Review), issue(2, Status::Backlog)];
        let ready = find_ready(&issues, &[], DEFAULT_READY_STATUSES);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id.raw(), 2);

        let ready = find_ready(&issues, &[], &[Status::Review]);
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id.raw(), 1);
    }

    #[test]
    fn sorted_by_priority_then_id() {
        let mut a = issue(1, Status::Todo);
        a.priority = Priority::Low;
        let mut b = issue(2, Status::Todo);
        b.priority = Priority::Critical;
        let mut c = issue(3, Status::Todo);
        c.priority = Priority::Critical;

        let ready = find_ready(&[a, b, c], &[], DEFAULT_READY_STATUSES);
        let ids: Vec<i64> = ready.iter().map(|i| i.id.raw()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
