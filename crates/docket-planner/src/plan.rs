//! Execution plan generation.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use docket_core::enums::Status;
use docket_core::filter::{has_all_labels, to_string_set};
use docket_core::id::IssueId;
use docket_core::issue::Issue;

use crate::error::PlanError;
use crate::graph::Dag;
use crate::topo::topo_phases;

/// Filters applied while generating a plan.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    /// Keep only these statuses (empty = all non-done).
    pub statuses: Vec<Status>,
    /// AND semantics: issue must carry all these labels.
    pub labels: Vec<String>,
    /// Scope to the parent sub-tree rooted here.
    pub root: Option<IssueId>,
}

/// One numbered phase of mutually independent issues.
#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub number: usize,
    pub issues: Vec<Issue>,
}

/// A phased execution plan over the dependency DAG.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub phases: Vec<Phase>,
    pub total_issues: usize,
    pub total_phases: usize,
    /// Size of the largest phase.
    pub max_parallelism: usize,
}

/// Generates a phased plan from issues and their directional relations.
///
/// Scoping (`root`) walks the parent tree, not the DAG; edges are then
/// rebuilt over the retained nodes only. `done` issues and issues failing
/// the status/label filters are dropped after the topological pass, and
/// surviving phases renumber 1..N with issues ordered by priority rank
/// then id.
pub fn generate_plan(
    issues: &[Issue],
    relations: &[docket_core::entity::Relation],
    filter: &PlanFilter,
) -> Result<Plan, PlanError> {
    let retained: Vec<&Issue> = match filter.root {
        Some(root) => scope_to_subtree(issues, root)?,
        None => issues.iter().collect(),
    };

    let dag = Dag::build(retained.iter().map(|i| i.id.raw()), relations);
    let levels = topo_phases(&dag)?;

    let by_id: std::collections::HashMap<i64, &Issue> =
        retained.iter().map(|i| (i.id.raw(), *i)).collect();
    let wanted_statuses: HashSet<Status> = filter.statuses.iter().copied().collect();
    let wanted_labels = to_string_set(&filter.labels);

    let mut phases: Vec<Phase> = Vec::new();
    let mut total_issues = 0;
    let mut max_parallelism = 0;

    for level in levels {
        let mut members: Vec<Issue> = level
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .filter(|issue| issue.status != Status::Done)
            .filter(|issue| {
                wanted_statuses.is_empty() || wanted_statuses.contains(&issue.status)
            })
            .filter(|issue| has_all_labels(&issue.labels, &wanted_labels))
            .cloned()
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by_key(|issue| (issue.priority.rank(), issue.id.raw()));

        total_issues += members.len();
        max_parallelism = max_parallelism.max(members.len());
        phases.push(Phase {
            number: phases.len() + 1,
            issues: members,
        });
    }

    Ok(Plan {
        total_phases: phases.len(),
        total_issues,
        max_parallelism,
        phases,
    })
}

/// BFS over the parent tree from `root`, returning the retained issues.
fn scope_to_subtree(issues: &[Issue], root: IssueId) -> Result<Vec<&Issue>, PlanError> {
    if !issues.iter().any(|i| i.id == root) {
        return Err(PlanError::UnknownRoot(root.raw()));
    }

    let mut keep: HashSet<i64> = HashSet::new();
    let mut queue: VecDeque<i64> = VecDeque::new();
    keep.insert(root.raw());
    queue.push_back(root.raw());

    while let Some(current) = queue.pop_front() {
        for issue in issues {
            if issue.parent_id.map(IssueId::raw) == Some(current) && keep.insert(issue.id.raw()) {
                queue.push_back(issue.id.raw());
            }
        }
    }

    Ok(issues.iter().filter(|i| keep.contains(&i.id.raw())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::entity::Relation;
    use docket_core::enums::{Priority, RelationType};
    use docket_core::issue::IssueBuilder;
    use docket_core::time;

    fn issue(id: i64, title: &str, status: Status) -> Issue {
        IssueBuilder::new(title)
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
    fn filtered_plan_matches_scenario() {
        // A(todo), B(backlog), C(done), D(in-progress); A blocks D, B blocks D.
        let issues = vec![
            issue(1, "A", Status::Todo),
            issue(2, "B", Status::Backlog),
            issue(3, "C", Status::Done),
            issue(4, "D", Status::InProgress),
        ];
        let relations = vec![blocks(1, 4), blocks(2, 4)];

        let plan = generate_plan(
            &issues,
            &relations,
            &PlanFilter {
                statuses: vec![Status::Todo, Status::Backlog, Status::InProgress],
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(plan.total_phases, 2);
        assert_eq!(plan.max_parallelism, 2);
        assert_eq!(plan.total_issues, 3);
        let titles = |phase: &Phase| {
            phase
                .issues
                .iter()
                .map(|i| i.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&plan.phases[0]), vec!["A", "B"]);
        assert_eq!(titles(&plan.phases[1]), vec!["D"]);
        assert_eq!(plan.phases[0].number, 1);
        assert_eq!(plan.phases[1].number, 2);
    }

    #[test]
    fn done_is_always_dropped() {
        let issues = vec![issue(1, "done", Status::Done), issue(2, "live", Status::Todo)];
        let plan = generate_plan(&issues, &[], &PlanFilter::default()).unwrap();
        assert_eq!(plan.total_issues, 1);
        assert_eq!(plan.phases[0].issues[0].title, "live");
    }

    #[test]
    fn phases_sorted_by_priority_then_id() {
        let mut low = issue(1, "low", Status::Todo);
        low.priority = Priority::Low;
        let mut critical = issue(2, "critical", Status::Todo);
        critical.priority = Priority::Critical;

        let plan = generate_plan(&[low, critical], &[], &PlanFilter::default()).unwrap();
        let titles: Vec<&str> = plan.phases[0]
            .issues
            .iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, vec!["critical", "low"]);
    }

    #[test]
    fn label_filter_is_and_combined() {
        let mut a = issue(1, "a", Status::Todo);
        a.labels = vec!["x".into(), "y".into()];
        let mut b = issue(2, "b", Status::Todo);
        b.labels = vec!["x".into()];

        let plan = generate_plan(
            &[a, b],
            &[],
            &PlanFilter {
                labels: vec!["x".into(), "y".into()],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.total_issues, 1);
        assert_eq!(plan.phases[0].issues[0].title, "a");
    }

    #[test]
    fn root_scopes_to_parent_tree() {
        let parent = issue(1, "parent", Status::Todo);
        let mut child = issue(2, "child", Status::Todo);
        child.parent_id = Some(IssueId::new(1).unwrap());
        let outsider = issue(3, "outsider", Status::Todo);
        // An edge into the outsider is rebuilt away once scoped.
        let relations = vec![blocks(3, 2)];

        let plan = generate_plan(
            &[parent, child, outsider],
            &relations,
            &PlanFilter {
                root: Some(IssueId::new(1).unwrap()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.total_issues, 2);
        assert_eq!(plan.total_phases, 1);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let issues = vec![issue(1, "a", Status::Todo)];
        let err = generate_plan(
            &issues,
            &[],
            &PlanFilter {
                root: Some(IssueId::new(9).unwrap()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, PlanError::UnknownRoot(9));
    }

    #[test]
    fn empty_levels_are_renumbered_away() {
        // 1 blocks 2; 1 is review and filtered out, so only 2 survives and
        // takes phase number 1.
        let issues = vec![issue(1, "gate", Status::Review), issue(2, "work", Status::Todo)];
        let relations = vec![blocks(1, 2)];
        let plan = generate_plan(
            &issues,
            &relations,
            &PlanFilter {
                statuses: vec![Status::Todo],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(plan.total_phases, 1);
        assert_eq!(plan.phases[0].number, 1);
        assert_eq!(plan.phases[0].issues[0].title, "work");
    }
}
