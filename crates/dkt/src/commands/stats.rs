//! `dkt stats` -- issue counts by status and priority.

use anyhow::Result;
use serde_json::json;

use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt stats` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let store = ctx.open_store()?;

    let total = store.count_issues()?;
    let roots = store.count_root_issues()?;
    let by_status = store.count_by_status()?;
    let by_priority = store.count_by_priority()?;

    let payload = json!({
        "total": total,
        "roots": roots,
        "by_status": by_status
            .iter()
            .map(|(status, count)| json!({"status": status, "count": count}))
            .collect::<Vec<_>>(),
        "by_priority": by_priority
            .iter()
            .map(|(priority, count)| json!({"priority": priority, "count": count}))
            .collect::<Vec<_>>(),
    });

    let mut lines = vec![format!("{total} issues ({roots} roots)"), String::new()];
    lines.push("By status:".to_string());
    for (status, count) in &by_status {
        lines.push(format!("  {status:<12} {count}"));
    }
    lines.push(String::new());
    lines.push("By priority:".to_string());
    for (priority, count) in &by_priority {
        lines.push(format!("  {priority:<12} {count}"));
    }

    output::emit_success(ctx, &payload, &lines.join("\n"));
    Ok(())
}
