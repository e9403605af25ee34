//! `dkt config` -- report resolved paths and database facts.

use anyhow::Result;
use serde_json::json;

use docket_config::DOCKET_PATH_ENV;
use docket_core::id::ID_PREFIX;
use docket_storage::Store;

use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt config` command.
///
/// Tolerates a missing database: sizes and versions report as zero and a
/// warning lands on stderr.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let db = ctx.db_path();
    let env_value = std::env::var(DOCKET_PATH_ENV).unwrap_or_default();

    let (db_size_bytes, schema_version) = if db.is_file() {
        let size = std::fs::metadata(&db).map(|m| m.len()).unwrap_or(0);
        let version = Store::open(&db)?.schema_version()?;
        (size, version)
    } else {
        output::warn(ctx, &format!("no database found at {}", db.display()));
        (0, 0)
    };

    let docket_path_set = !env_value.trim().is_empty();
    let payload = json!({
        "db_path": db.display().to_string(),
        "db_size_bytes": db_size_bytes,
        "schema_version": schema_version,
        "issue_prefix": ID_PREFIX,
        "docket_path_env": env_value,
        "docket_path_set": docket_path_set,
    });
    let message = format!(
        "Database: {}\nSize: {} bytes\nSchema version: {}\nIssue prefix: {}",
        db.display(),
        db_size_bytes,
        schema_version,
        ID_PREFIX
    );
    output::emit_success(ctx, &payload, &message);
    Ok(())
}
