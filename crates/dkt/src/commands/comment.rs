//! `dkt comment` -- add and list comments.

use anyhow::Result;
use serde_json::json;

use crate::cli::{CommentCommands, IdArg};
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt comment` subcommands.
pub fn run(ctx: &RuntimeContext, command: &CommentCommands) -> Result<()> {
    match command {
        CommentCommands::Add(args) => {
            let store = ctx.open_store()?;
            let id = parse_id(&args.id)?;
            let comment = store.create_comment(id, &args.body, Some(ctx.author.as_str()))?;
            let message = format!("Added comment {} to {id}", comment.id);
            output::emit_success(ctx, &comment, &message);
            Ok(())
        }
        CommentCommands::List(args) => run_list(ctx, args),
    }
}

/// Execute `dkt comments` / `dkt comment list`.
pub fn run_list(ctx: &RuntimeContext, args: &IdArg) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(&args.id)?;
    let comments = store.list_comments(id)?;

    let payload = json!({"comments": &comments});
    let message = if comments.is_empty() {
        format!("No comments on {id}")
    } else {
        comments
            .iter()
            .map(|comment| {
                format!(
                    "[{}] {}: {}",
                    docket_core::time::format_ts(&comment.created_at),
                    comment.author.as_deref().unwrap_or("anonymous"),
                    comment.body
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
