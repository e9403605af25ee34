//! `dkt label` -- manage labels.

use anyhow::Result;
use serde_json::json;

use crate::cli::LabelCommands;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt label` subcommands.
pub fn run(ctx: &RuntimeContext, command: &LabelCommands) -> Result<()> {
    let store = ctx.open_store()?;
    match command {
        LabelCommands::Add(args) => {
            let id = parse_id(&args.id)?;
            store.add_labels_to_issue(id, &args.names, args.color.as_deref(), &ctx.author)?;
            let issue = store.get_issue(id)?;
            let message = format!("Labels on {id}: {}", issue.labels.join(", "));
            output::emit_success(ctx, &issue, &message);
        }
        LabelCommands::Rm(args) => {
            let id = parse_id(&args.id)?;
            store.remove_labels_from_issue(id, &args.names, &ctx.author)?;
            let issue = store.get_issue(id)?;
            let message = if issue.labels.is_empty() {
                format!("No labels left on {id}")
            } else {
                format!("Labels on {id}: {}", issue.labels.join(", "))
            };
            output::emit_success(ctx, &issue, &message);
        }
        LabelCommands::List => {
            let labels = store.list_all_labels()?;
            let payload = json!({
                "labels": labels
                    .iter()
                    .map(|(label, count)| json!({
                        "id": label.id,
                        "name": label.name,
                        "color": label.color,
                        "issues": count,
                    }))
                    .collect::<Vec<_>>(),
            });
            let message = if labels.is_empty() {
                "No labels".to_string()
            } else {
                labels
                    .iter()
                    .map(|(label, count)| format!("{} ({count})", label.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            output::emit_success(ctx, &payload, &message);
        }
        LabelCommands::Delete(args) => {
            let affected = store.delete_label(&args.name, &ctx.author)?;
            let payload = json!({
                "name": args.name,
                "removed_from": affected.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
            });
            let message = format!(
                "Deleted label {:?} (removed from {} issues)",
                args.name,
                affected.len()
            );
            output::emit_success(ctx, &payload, &message);
        }
    }
    Ok(())
}
