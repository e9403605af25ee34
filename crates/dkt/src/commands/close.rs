//! `dkt close` / `dkt reopen` -- status shortcuts.

use anyhow::Result;

use docket_core::enums::Status;
use docket_storage::IssueChanges;

use crate::cli::IdArg;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt close` command: status becomes `done`.
pub fn run_close(ctx: &RuntimeContext, args: &IdArg) -> Result<()> {
    set_status(ctx, &args.id, Status::Done, "Closed")
}

/// Execute the `dkt reopen` command: status goes back to `todo`.
pub fn run_reopen(ctx: &RuntimeContext, args: &IdArg) -> Result<()> {
    set_status(ctx, &args.id, Status::Todo, "Reopened")
}

fn set_status(ctx: &RuntimeContext, raw_id: &str, status: Status, verb: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(raw_id)?;

    store.update_issue(
        id,
        &IssueChanges {
            status: Some(status),
            ..Default::default()
        },
        &ctx.author,
    )?;
    let issue = store.get_issue(id)?;

    output::emit_success(ctx, &issue, &format!("{verb} {id}"));
    Ok(())
}
