//! `dkt board` -- issues grouped by status.

use anyhow::Result;
use serde_json::json;

use docket_core::enums::Status;
use docket_core::filter::ListFilter;

use crate::commands::issue_line;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt board` command. Every status appears as a column,
/// `done` included.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let store = ctx.open_store()?;
    let (issues, _) = store.list_issues(&ListFilter {
        include_done: true,
        ..Default::default()
    })?;

    let columns: Vec<_> = Status::ALL
        .iter()
        .map(|status| {
            let members: Vec<_> = issues.iter().filter(|i| i.status == *status).collect();
            (status, members)
        })
        .collect();

    let payload = json!({
        "columns": columns
            .iter()
            .map(|(status, members)| json!({
                "status": status,
                "issues": members,
            }))
            .collect::<Vec<_>>(),
    });

    let mut lines = Vec::new();
    for (status, members) in &columns {
        lines.push(format!("{status} ({})", members.len()));
        for issue in members {
            lines.push(format!("  {}", issue_line(issue)));
        }
    }
    output::emit_success(ctx, &payload, &lines.join("\n"));
    Ok(())
}
