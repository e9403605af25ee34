//! `dkt show` -- one issue in full.

use anyhow::Result;
use serde_json::json;

use crate::cli::ShowArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt show` command.
pub fn run(ctx: &RuntimeContext, args: &ShowArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(&args.id)?;

    let issue = store.get_issue(id)?;
    let comments = store.list_comments(id)?;
    let activity = store.list_activity(id)?;
    let relations = store.get_issue_relations(id)?;
    let (done, total) = store.get_sub_issue_progress(id)?;

    let payload = json!({
        "issue": &issue,
        "comments": &comments,
        "activity": &activity,
        "relations": &relations,
        "sub_issues": {"done": done, "total": total},
    });

    let mut lines = Vec::new();
    lines.push(format!(
        "{} [{}/{}] {}",
        issue.id, issue.priority, issue.kind, issue.title
    ));
    lines.push(format!("Status: {}", issue.status));
    if !issue.assignee.is_empty() {
        lines.push(format!("Assignee: {}", issue.assignee));
    }
    if let Some(parent) = issue.parent_id {
        lines.push(format!("Parent: {parent}"));
    }
    if total > 0 {
        lines.push(format!("Sub-issues: {done}/{total} done"));
    }
    lines.push(format!(
        "Created: {}",
        docket_core::time::format_ts(&issue.created_at)
    ));
    lines.push(format!(
        "Updated: {}",
        docket_core::time::format_ts(&issue.updated_at)
    ));
    if !issue.labels.is_empty() {
        lines.push(format!("Labels: {}", issue.labels.join(", ")));
    }
    if !issue.files.is_empty() {
        lines.push(format!("Files: {}", issue.files.join(", ")));
    }
    if !issue.description.is_empty() {
        lines.push(String::new());
        lines.push(issue.description.clone());
    }
    if !relations.is_empty() {
        lines.push(String::new());
        lines.push("Relations:".to_string());
        for relation in &relations {
            lines.push(format!(
                "  {} {} {}",
                relation.source_id,
                relation.relation_type.as_str(),
                relation.target_id
            ));
        }
    }
    if !comments.is_empty() {
        lines.push(String::new());
        lines.push(format!("Comments ({}):", comments.len()));
        for comment in &comments {
            lines.push(format!(
                "  [{}] {}: {}",
                docket_core::time::format_ts(&comment.created_at),
                comment.author.as_deref().unwrap_or("anonymous"),
                comment.body
            ));
        }
    }

    output::emit_success(ctx, &payload, &lines.join("\n"));
    Ok(())
}
