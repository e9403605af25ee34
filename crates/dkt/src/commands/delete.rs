//! `dkt delete` -- delete an issue, cascading or detaching children.

use anyhow::Result;
use serde_json::json;

use docket_storage::StoreError;

use crate::cli::DeleteArgs;
use crate::commands::parse_id;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt delete` command.
///
/// An issue with sub-issues needs `--force` (delete them too) or
/// `--orphan` (detach them first); otherwise the delete conflicts.
pub fn run(ctx: &RuntimeContext, args: &DeleteArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(&args.id)?;

    let children = store.get_sub_issues(id)?;

    let (removed, detached) = if args.force {
        (store.cascade_delete_issue(id)?, 0)
    } else if args.orphan {
        let orphaned = store.orphan_sub_issues(id, &ctx.author)?;
        store.delete_issue(id)?;
        (1, orphaned.len())
    } else if children.is_empty() {
        store.delete_issue(id)?;
        (1, 0)
    } else {
        return Err(StoreError::conflict(format!(
            "{id} has {} sub-issues (use --force to delete them or --orphan to detach)",
            children.len()
        ))
        .into());
    };

    let payload = json!({
        "id": id.to_string(),
        "deleted": removed,
        "detached": detached,
    });
    let message = if removed > 1 {
        format!("Deleted {id} and {} sub-issues", removed - 1)
    } else if detached > 0 {
        format!("Deleted {id}, detached {detached} sub-issues")
    } else {
        format!("Deleted {id}")
    };
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
