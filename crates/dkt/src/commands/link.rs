//! `dkt link` -- manage relations between issues.

use anyhow::Result;
use serde_json::json;

use crate::cli::{IdArg, LinkCommands};
use crate::commands::{parse_id, parse_relation_type};
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt link` subcommands.
pub fn run(ctx: &RuntimeContext, command: &LinkCommands) -> Result<()> {
    let store = ctx.open_store()?;
    match command {
        LinkCommands::Add(args) => {
            let source = parse_id(&args.source)?;
            let target = parse_id(&args.target)?;
            let rtype = parse_relation_type(&args.relation_type)?;
            let relation = store.create_relation(source, target, rtype, &ctx.author)?;
            let message = format!("Linked {source} {} {target}", rtype.as_str());
            output::emit_success(ctx, &relation, &message);
        }
        LinkCommands::Remove(args) => {
            let source = parse_id(&args.source)?;
            let target = parse_id(&args.target)?;
            let rtype = parse_relation_type(&args.relation_type)?;
            store.delete_relation(source, target, rtype, &ctx.author)?;
            let payload = json!({
                "source": source.to_string(),
                "target": target.to_string(),
                "relation_type": rtype.as_str(),
            });
            let message = format!("Removed {} link between {source} and {target}", rtype.as_str());
            output::emit_success(ctx, &payload, &message);
        }
        LinkCommands::List(IdArg { id }) => {
            let id = parse_id(id)?;
            let relations = store.get_issue_relations(id)?;
            let payload = json!({"relations": &relations});
            let message = if relations.is_empty() {
                format!("No relations on {id}")
            } else {
                relations
                    .iter()
                    .map(|r| format!("{} {} {}", r.source_id, r.relation_type.as_str(), r.target_id))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            output::emit_success(ctx, &payload, &message);
        }
    }
    Ok(())
}
