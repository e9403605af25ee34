//! `dkt version` -- print version information.

use anyhow::Result;
use serde_json::json;

use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let payload = json!({
        "name": "dkt",
        "version": version,
    });
    output::emit_success(ctx, &payload, &format!("dkt {version}"));
    Ok(())
}
