//! `dkt import` -- import a JSON export document.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use serde_json::json;

use docket_storage::{ImportMode, StoreError, transfer};

use crate::cli::ImportArgs;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt import` command.
///
/// Default mode requires an empty database; `--merge` insert-or-ignores;
/// `--replace` clears everything first. In human mode `--replace` asks
/// for confirmation; in structured mode the flag itself is the
/// confirmation.
pub fn run(ctx: &RuntimeContext, args: &ImportArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let raw = std::fs::read_to_string(&args.path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(StoreError::not_found("file", &args.path))
        } else {
            anyhow::Error::new(e).context(format!("failed to read {}", args.path))
        }
    })?;
    let doc = transfer::parse_document(&raw)
        .with_context(|| format!("invalid export document {}", args.path))?;

    let mode = if args.merge {
        ImportMode::Merge
    } else if args.replace {
        ImportMode::Replace
    } else {
        ImportMode::RequireEmpty
    };

    if mode == ImportMode::Replace && !ctx.json && !confirm_replace()? {
        output::info(ctx, "Import cancelled");
        return Ok(());
    }

    let counts = transfer::import_document(&store, &doc, mode)?;

    let payload = json!({
        "imported": counts.imported,
        "skipped": counts.skipped,
    });
    let message = format!("Imported {} rows ({} skipped)", counts.imported, counts.skipped);
    output::emit_success(ctx, &payload, &message);
    Ok(())
}

/// Interactive yes/no for `--replace`. Non-interactive stdin counts as a
/// refusal rather than silently destroying data.
fn confirm_replace() -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    eprint!("This will delete all existing data. Continue? [y/N] ");
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
