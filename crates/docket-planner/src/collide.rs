//! File-collision sub-phasing.
//!
//! Splits one phase into sub-phases whose members touch disjoint file
//! sets, so they can run truly in parallel. Pure helper: any view that
//! needs collision-free groups can call it; the primary [`Plan`]
//! structure stays unsplit.
//!
//! [`Plan`]: crate::plan::Plan

use std::collections::HashSet;

use docket_core::issue::Issue;

/// Greedily splits `issues` (already in priority order) into sub-phases.
///
/// Each pass claims the files of admitted issues; an issue overlapping a
/// claimed file is deferred to a later sub-phase. Issues with no files
/// never collide and are always admitted.
pub fn split_file_collisions(issues: &[Issue]) -> Vec<Vec<Issue>> {
    let mut remaining: Vec<&Issue> = issues.iter().collect();
    let mut sub_phases: Vec<Vec<Issue>> = Vec::new();

    while !remaining.is_empty() {
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut admitted: Vec<Issue> = Vec::new();
        let mut deferred: Vec<&Issue> = Vec::new();

        for issue in remaining {
            let collides = issue
                .files
                .iter()
                .any(|path| claimed.contains(path.as_str()));
            if collides {
                deferred.push(issue);
            } else {
                claimed.extend(issue.files.iter().map(String::as_str));
                admitted.push(issue.clone());
            }
        }

        sub_phases.push(admitted);
        remaining = deferred;
    }

    sub_phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::id::IssueId;
    use docket_core::issue::IssueBuilder;

    fn issue(id: i64, files: &[&str]) -> Issue {
        IssueBuilder::new(format!("issue {id}"))
            .id(IssueId::new(id).unwrap())
            .files(files.iter().map(|f| f.to_string()).collect())
            .build()
    }

    #[test]
    fn disjoint_issues_share_a_sub_phase() {
        let issues = vec![issue(1, &["a.rs"]), issue(2, &["b.rs"]), issue(3, &[])];
        let split = split_file_collisions(&issues);
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].len(), 3);
    }

    #[test]
    fn overlap_defers_to_later_sub_phase() {
        let issues = vec![
            issue(1, &["a.rs", "b.rs"]),
            issue(2, &["b.rs"]),
            issue(3, &["c.rs"]),
        ];
        let split = split_file_collisions(&issues);
        assert_eq!(split.len(), 2);
        let ids = |phase: &[Issue]| phase.iter().map(|i| i.id.raw()).collect::<Vec<_>>();
        assert_eq!(ids(&split[0]), vec![1, 3]);
        assert_eq!(ids(&split[1]), vec![2]);
    }

    #[test]
    fn chain_of_overlaps_degrades_to_serial() {
        let issues = vec![
            issue(1, &["x.rs"]),
            issue(2, &["x.rs"]),
            issue(3, &["x.rs"]),
        ];
        let split = split_file_collisions(&issues);
        assert_eq!(split.len(), 3);
        for phase in &split {
            assert_eq!(phase.len(), 1);
        }
    }

    #[test]
    fn empty_input_yields_no_sub_phases() {
        assert!(split_file_collisions(&[]).is_empty());
    }
}
