//! `dkt next` -- work-ready issues.

use anyhow::Result;
use serde_json::json;

use docket_core::filter::ListFilter;
use docket_planner::{DEFAULT_READY_STATUSES, find_ready};

use crate::cli::NextArgs;
use crate::commands::{issue_line, parse_statuses};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt next` command.
pub fn run(ctx: &RuntimeContext, args: &NextArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let allowed = if args.statuses.is_empty() {
        DEFAULT_READY_STATUSES.to_vec()
    } else {
        parse_statuses(&args.statuses)?
    };

    // The full issue set is needed so done blockers count as done.
    let (issues, _) = store.list_issues(&ListFilter {
        include_done: true,
        ..Default::default()
    })?;
    let relations = store.get_all_directional_relations()?;

    let ready = find_ready(&issues, &relations, &allowed);

    let payload = json!({"issues": &ready, "total": ready.len()});
    let message = if ready.is_empty() {
        "No ready work".to_string()
    } else {
        ready
            .iter()
            .enumerate()
            .map(|(idx, issue)| format!("{}. {}", idx + 1, issue_line(issue)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
