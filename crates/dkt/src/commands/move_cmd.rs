//! `dkt move` -- move an issue to another status.

use anyhow::Result;

use docket_storage::IssueChanges;

use crate::cli::MoveArgs;
use crate::commands::{parse_id, parse_status};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt move` command.
pub fn run(ctx: &RuntimeContext, args: &MoveArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(&args.id)?;
    let status = parse_status(&args.status)?;

    store.update_issue(
        id,
        &IssueChanges {
            status: Some(status),
            ..Default::default()
        },
        &ctx.author,
    )?;
    let issue = store.get_issue(id)?;

    output::emit_success(ctx, &issue, &format!("Moved {id} to {status}"));
    Ok(())
}
