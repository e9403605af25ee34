//! `dkt file` -- manage file attachments.

use anyhow::Result;
use serde_json::json;

use crate::cli::{FileCommands, IdArg};
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt file` subcommands.
pub fn run(ctx: &RuntimeContext, command: &FileCommands) -> Result<()> {
    let store = ctx.open_store()?;
    match command {
        FileCommands::Add(args) => {
            let id = parse_id(&args.id)?;
            let added = store.attach_files(id, &args.paths, &ctx.author)?;
            let files = store.get_issue_files(id)?;
            let payload = json!({"id": id.to_string(), "added": added, "files": files});
            output::emit_success(ctx, &payload, &format!("Attached {added} files to {id}"));
        }
        FileCommands::Remove(args) => {
            let id = parse_id(&args.id)?;
            store.detach_files(id, &args.paths, &ctx.author)?;
            let files = store.get_issue_files(id)?;
            let payload = json!({"id": id.to_string(), "files": files});
            output::emit_success(
                ctx,
                &payload,
                &format!("Detached {} files from {id}", args.paths.len()),
            );
        }
        FileCommands::List(IdArg { id }) => {
            let id = parse_id(id)?;
            let files = store.get_issue_files(id)?;
            let payload = json!({"id": id.to_string(), "files": &files});
            let message = if files.is_empty() {
                format!("No files on {id}")
            } else {
                files.join("\n")
            };
            output::emit_success(ctx, &payload, &message);
        }
    }
    Ok(())
}
