//! `dkt edit` -- partial field updates, including reparenting.

use anyhow::Result;

use docket_storage::IssueChanges;

use crate::cli::EditArgs;
use crate::commands::{parse_id, parse_kind, parse_priority, parse_status};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt edit` command.
pub fn run(ctx: &RuntimeContext, args: &EditArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(&args.id)?;

    // `--parent none` detaches; any other value must parse as an id.
    let parent_id = match args.parent.as_deref() {
        None => None,
        Some(raw) if raw.eq_ignore_ascii_case("none") => Some(None),
        Some(raw) => Some(Some(parse_id(raw)?)),
    };

    let changes = IssueChanges {
        title: args.title.clone(),
        description: args.description.clone(),
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        kind: args.kind.as_deref().map(parse_kind).transpose()?,
        assignee: args.assignee.clone(),
        parent_id,
    };

    if changes.is_empty() {
        output::info(ctx, "nothing to change");
    }

    store.update_issue(id, &changes, &ctx.author)?;
    let issue = store.get_issue(id)?;

    output::emit_success(ctx, &issue, &format!("Updated {id}"));
    Ok(())
}
