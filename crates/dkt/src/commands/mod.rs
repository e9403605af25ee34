//! Command handlers: thin orchestrators binding CLI inputs to the store
//! and planner, emitting envelopes via [`crate::output`].

pub mod board;
pub mod close;
pub mod comment;
pub mod config_cmd;
pub mod create;
pub mod delete;
pub mod edit;
pub mod export;
pub mod file;
pub mod graph;
pub mod import;
pub mod init;
pub mod label;
pub mod link;
pub mod list;
pub mod move_cmd;
pub mod next;
pub mod plan;
pub mod show;
pub mod stats;
pub mod version;

use anyhow::Result;

use docket_core::enums::{Kind, Priority, RelationType, Status};
use docket_core::id::IssueId;

/// Parses an issue id from either the `DKT-N` or bare form.
pub(crate) fn parse_id(raw: &str) -> Result<IssueId> {
    Ok(raw.parse::<IssueId>()?)
}

/// Parses a status value.
pub(crate) fn parse_status(raw: &str) -> Result<Status> {
    Ok(raw.parse::<Status>()?)
}

/// Parses a list of status values.
pub(crate) fn parse_statuses(raw: &[String]) -> Result<Vec<Status>> {
    raw.iter().map(|s| parse_status(s)).collect()
}

/// Parses a priority value.
pub(crate) fn parse_priority(raw: &str) -> Result<Priority> {
    Ok(raw.parse::<Priority>()?)
}

/// Parses an issue type value.
pub(crate) fn parse_kind(raw: &str) -> Result<Kind> {
    Ok(raw.parse::<Kind>()?)
}

/// Parses a relation type value.
pub(crate) fn parse_relation_type(raw: &str) -> Result<RelationType> {
    Ok(raw.parse::<RelationType>()?)
}

/// One-line summary used across list-like human output.
pub(crate) fn issue_line(issue: &docket_core::issue::Issue) -> String {
    let assignee = if issue.assignee.is_empty() {
        String::new()
    } else {
        format!(" @{}", issue.assignee)
    };
    format!(
        "{} [{}/{}] {} ({}{})",
        issue.id, issue.priority, issue.kind, issue.title, issue.status, assignee
    )
}
