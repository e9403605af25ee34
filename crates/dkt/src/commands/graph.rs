//! `dkt graph` -- walk the dependency graph from an issue.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde_json::json;

use docket_core::filter::ListFilter;
use docket_planner::{Dag, Direction, traverse};

use crate::cli::GraphArgs;
use crate::commands::{issue_line, parse_id};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt graph` command.
pub fn run(ctx: &RuntimeContext, args: &GraphArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let start = parse_id(&args.id)?;
    // Fails with NotFound before any graph work.
    store.get_issue(start)?;

    let direction: Direction = args
        .direction
        .parse()
        .map_err(|e: String| docket_storage::StoreError::validation(e))?;

    let (issues, _) = store.list_issues(&ListFilter {
        include_done: true,
        ..Default::default()
    })?;
    let relations = store.get_all_directional_relations()?;

    let dag = Dag::build(issues.iter().map(|i| i.id.raw()), &relations);
    let nodes = traverse(&dag, start.raw(), direction, args.depth);

    let by_id: HashMap<i64, _> = issues.iter().map(|i| (i.id.raw(), i)).collect();
    let visited: HashSet<i64> = nodes.iter().map(|n| n.issue_id).collect();
    let edges: Vec<_> = relations
        .iter()
        .filter(|r| visited.contains(&r.source_id.raw()) && visited.contains(&r.target_id.raw()))
        .collect();

    let payload = json!({
        "nodes": nodes
            .iter()
            .filter_map(|node| {
                by_id.get(&node.issue_id).map(|issue| json!({
                    "issue": issue,
                    "depth": node.depth,
                }))
            })
            .collect::<Vec<_>>(),
        "edges": edges,
    });

    let message = nodes
        .iter()
        .filter_map(|node| {
            by_id
                .get(&node.issue_id)
                .map(|issue| format!("{}{}", "  ".repeat(node.depth), issue_line(issue)))
        })
        .collect::<Vec<_>>()
        .join("\n");
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
