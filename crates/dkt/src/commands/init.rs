//! `dkt init` -- create the docket directory and database.

use anyhow::{Context, Result};
use serde_json::json;

use docket_config::ensure_docket_dir;
use docket_storage::Store;

use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt init` command. Idempotent: re-running reports
/// `created: false` with the current schema version.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    ensure_docket_dir(&ctx.docket_dir)
        .with_context(|| format!("failed to prepare {}", ctx.docket_dir.display()))?;

    let db = ctx.db_path();
    let created = !db.is_file();
    let store = Store::open(&db)?;
    let schema_version = store.schema_version()?;

    let payload = json!({
        "created": created,
        "docket_path": ctx.docket_dir.display().to_string(),
        "db_path": db.display().to_string(),
        "schema_version": schema_version,
    });
    let message = if created {
        format!("Initialized docket in {}", ctx.docket_dir.display())
    } else {
        format!("Docket already initialized (schema version {schema_version})")
    };
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
