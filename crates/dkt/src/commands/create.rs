//! `dkt create` -- create an issue.

use anyhow::Result;

use docket_core::issue::IssueBuilder;

use crate::cli::CreateArgs;
use crate::commands::{parse_id, parse_kind, parse_priority, parse_status};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt create` command.
pub fn run(ctx: &RuntimeContext, args: &CreateArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let mut builder = IssueBuilder::new(args.title.clone())
        .description(args.description.clone())
        .labels(args.labels.clone())
        .files(args.files.clone());
    if let Some(ref status) = args.status {
        builder = builder.status(parse_status(status)?);
    }
    if let Some(ref priority) = args.priority {
        builder = builder.priority(parse_priority(priority)?);
    }
    if let Some(ref kind) = args.kind {
        builder = builder.kind(parse_kind(kind)?);
    }
    if let Some(ref assignee) = args.assignee {
        builder = builder.assignee(assignee.clone());
    }
    if let Some(ref parent) = args.parent {
        builder = builder.parent(parse_id(parent)?);
    }

    let id = store.create_issue(&builder.build(), &ctx.author)?;
    let issue = store.get_issue(id)?;

    let message = format!("Created {id}: {}", issue.title);
    output::emit_success(ctx, &issue, &message);
    Ok(())
}
