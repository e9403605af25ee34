//! `dkt list` -- list issues with filters and sorting.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde_json::json;

use docket_core::filter::{ListFilter, Sort};
use docket_core::id::IssueId;
use docket_core::issue::Issue;

use crate::cli::ListArgs;
use crate::commands::{issue_line, parse_id, parse_kind, parse_priority, parse_statuses};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt list` command.
pub fn run(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let filter = ListFilter {
        statuses: parse_statuses(&args.statuses)?,
        priorities: args
            .priorities
            .iter()
            .map(|p| parse_priority(p))
            .collect::<Result<_>>()?,
        kinds: args
            .kinds
            .iter()
            .map(|k| parse_kind(k))
            .collect::<Result<_>>()?,
        assignee: args.assignee.clone(),
        parent: args.parent.as_deref().map(parse_id).transpose()?,
        roots: args.roots,
        labels: args.labels.clone(),
        include_done: args.all,
        sort: args.sort.as_deref().map(str::parse::<Sort>).transpose()?,
    };

    let (issues, total) = store.list_issues(&filter)?;

    let payload = json!({
        "issues": &issues,
        "total": total,
    });
    let message = if issues.is_empty() {
        "No issues found".to_string()
    } else if args.tree {
        render_tree(&issues)
    } else {
        issues.iter().map(issue_line).collect::<Vec<_>>().join("\n")
    };
    output::emit_success(ctx, &payload, &message);
    Ok(())
}

/// Indented parent/child rendering. Issues whose parent is outside the
/// result set count as roots so filtered trees still display.
fn render_tree(issues: &[Issue]) -> String {
    let present: HashSet<i64> = issues.iter().map(|i| i.id.raw()).collect();
    let mut children: HashMap<i64, Vec<&Issue>> = HashMap::new();
    let mut roots: Vec<&Issue> = Vec::new();
    for issue in issues {
        match issue.parent_id.map(IssueId::raw) {
            Some(parent) if present.contains(&parent) => {
                children.entry(parent).or_default().push(issue);
            }
            _ => roots.push(issue),
        }
    }

    let mut lines = Vec::new();
    for root in roots {
        render_node(root, 0, &children, &mut lines);
    }
    lines.join("\n")
}

fn render_node(
    issue: &Issue,
    depth: usize,
    children: &HashMap<i64, Vec<&Issue>>,
    lines: &mut Vec<String>,
) {
    lines.push(format!("{}{}", "  ".repeat(depth), issue_line(issue)));
    if let Some(kids) = children.get(&issue.id.raw()) {
        for kid in kids {
            render_node(kid, depth + 1, children, lines);
        }
    }
}
