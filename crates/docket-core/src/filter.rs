//! Filter types for querying issues.
//!
//! The same semantics apply whether a filter is compiled to SQL by the
//! store or evaluated in memory by the planner: repeated values within one
//! field are OR-combined, except labels which are AND-combined.

use std::collections::HashSet;
use std::str::FromStr;

use crate::enums::{Kind, Priority, Status};
use crate::id::IssueId;

/// Sort fields accepted by `ListFilter`.
pub const SORT_FIELDS: &[&str] = &[
    "id",
    "title",
    "status",
    "priority",
    "type",
    "assignee",
    "created_at",
    "updated_at",
];

/// Filter for issue list queries.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// OR semantics: issue status must be one of these.
    pub statuses: Vec<Status>,
    /// OR semantics.
    pub priorities: Vec<Priority>,
    /// OR semantics.
    pub kinds: Vec<Kind>,
    pub assignee: Option<String>,
    /// Restrict to direct children of this issue.
    pub parent: Option<IssueId>,
    /// Restrict to issues without a parent.
    pub roots: bool,
    /// AND semantics: issue must have ALL these labels.
    pub labels: Vec<String>,
    /// Include `done` issues even without an explicit status filter.
    pub include_done: bool,
    pub sort: Option<Sort>,
}

impl ListFilter {
    /// Returns `true` if `done` issues should appear in the result.
    ///
    /// Done is excluded by default but an explicit `status=done` filter is
    /// honoured.
    pub fn wants_done(&self) -> bool {
        self.include_done || self.statuses.contains(&Status::Done)
    }
}

/// A validated sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

/// Error returned for a malformed or disallowed sort specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("unknown sort field {field:?} (expected one of: {})", SORT_FIELDS.join(", "))]
    UnknownField { field: String },

    #[error("invalid sort direction {dir:?} (expected asc or desc)")]
    InvalidDirection { dir: String },
}

impl FromStr for Sort {
    type Err = SortError;

    /// Parses `field` or `field:dir` where dir is `asc` or `desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, dir) = match s.split_once(':') {
            Some((f, d)) => (f, Some(d)),
            None => (s, None),
        };
        let field = field.trim().to_ascii_lowercase();

        // Allowlist plus a conservative identifier check. Both must pass
        // before the field name is ever spliced into SQL.
        if !SORT_FIELDS.contains(&field.as_str()) || !is_identifier(&field) {
            return Err(SortError::UnknownField { field });
        }

        let descending = match dir.map(|d| d.trim().to_ascii_lowercase()) {
            None => false,
            Some(d) if d == "asc" => false,
            Some(d) if d == "desc" => true,
            Some(d) => return Err(SortError::InvalidDirection { dir: d }),
        };

        Ok(Self { field, descending })
    }
}

/// Matches `^[a-z_][a-z0-9_]*$`.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Collects strings into a set for membership tests.
pub fn to_string_set<S: AsRef<str>>(values: &[S]) -> HashSet<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}

/// Returns `true` iff every required label is present on the issue.
///
/// An empty requirement matches everything.
pub fn has_all_labels(issue_labels: &[String], required: &HashSet<String>) -> bool {
    required.iter().all(|r| issue_labels.iter().any(|l| l == r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parse_field_only() {
        let sort: Sort = "priority".parse().unwrap();
        assert_eq!(sort.field, "priority");
        assert!(!sort.descending);
    }

    #[test]
    fn sort_parse_with_direction() {
        let sort: Sort = "created_at:desc".parse().unwrap();
        assert!(sort.descending);
        let sort: Sort = "title:ASC".parse().unwrap();
        assert!(!sort.descending);
    }

    #[test]
    fn sort_rejects_unknown_field() {
        assert!(matches!(
            "body".parse::<Sort>(),
            Err(SortError::UnknownField { .. })
        ));
        // Injection-shaped input never reaches SQL.
        assert!("id; DROP TABLE issues".parse::<Sort>().is_err());
    }

    #[test]
    fn sort_rejects_bad_direction() {
        assert!(matches!(
            "id:sideways".parse::<Sort>(),
            Err(SortError::InvalidDirection { .. })
        ));
    }

    #[test]
    fn wants_done_with_explicit_status() {
        let mut filter = ListFilter::default();
        assert!(!filter.wants_done());
        filter.statuses.push(Status::Done);
        assert!(filter.wants_done());

        let filter = ListFilter {
            include_done: true,
            ..Default::default()
        };
        assert!(filter.wants_done());
    }

    #[test]
    fn has_all_labels_and_semantics() {
        let labels = vec!["backend".to_string(), "urgent".to_string()];
        let required = to_string_set(&["backend", "urgent"]);
        assert!(has_all_labels(&labels, &required));

        let missing = to_string_set(&["backend", "frontend"]);
        assert!(!has_all_labels(&labels, &missing));

        let empty: HashSet<String> = HashSet::new();
        assert!(has_all_labels(&labels, &empty));
    }
}
