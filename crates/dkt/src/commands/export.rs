//! `dkt export` -- export the database as JSON, CSV, or Markdown.
//!
//! Only the JSON document round-trips through `dkt import`; CSV and
//! Markdown are human-oriented renderings.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde_json::json;

use docket_core::enums::Status;
use docket_core::filter::{has_all_labels, to_string_set};
use docket_core::time;
use docket_storage::{ExportDocument, StoreError, transfer};

use crate::cli::ExportArgs;
use crate::commands::parse_statuses;
use crate::context::RuntimeContext;
use crate::output;

/// Execute the `dkt export` command.
pub fn run(ctx: &RuntimeContext, args: &ExportArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let mut doc = transfer::export_document(&store)?;

    let statuses = parse_statuses(&args.statuses)?;
    if !statuses.is_empty() || !args.labels.is_empty() {
        filter_document(&mut doc, &statuses, &args.labels);
    }

    let rendered = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(&doc)?,
        "csv" => render_csv(&doc),
        "markdown" | "md" => render_markdown(&doc),
        other => {
            return Err(StoreError::validation(format!(
                "unknown export format {other:?} (expected json, csv, or markdown)"
            ))
            .into());
        }
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &rendered)?;
        let payload = json!({
            "path": path,
            "format": args.format,
            "issues": doc.issues.len(),
        });
        let message = format!("Exported {} issues to {path}", doc.issues.len());
        output::emit_success(ctx, &payload, &message);
        return Ok(());
    }

    if args.format == "json" {
        output::emit_success(ctx, &doc, &rendered);
    } else {
        let payload = json!({"format": args.format, "content": rendered});
        output::emit_success(ctx, &payload, &rendered);
    }
    Ok(())
}

/// Restricts the document to issues matching the status (OR) and label
/// (AND) filters, pruning every dependent collection to match.
fn filter_document(doc: &mut ExportDocument, statuses: &[Status], labels: &[String]) {
    let wanted_labels = to_string_set(labels);
    let names = label_names(doc);

    let keep: HashSet<i64> = doc
        .issues
        .iter()
        .filter(|issue| statuses.is_empty() || statuses.contains(&issue.status))
        .filter(|issue| {
            let issue_labels = names.get(&issue.id.raw()).cloned().unwrap_or_default();
            has_all_labels(&issue_labels, &wanted_labels)
        })
        .map(|issue| issue.id.raw())
        .collect();

    doc.issues.retain(|i| keep.contains(&i.id.raw()));
    // Parent links pointing outside the export are dropped.
    for issue in &mut doc.issues {
        if let Some(parent) = issue.parent_id {
            if !keep.contains(&parent.raw()) {
                issue.parent_id = None;
            }
        }
    }
    doc.comments.retain(|c| keep.contains(&c.issue_id.raw()));
    doc.relations
        .retain(|r| keep.contains(&r.source_id.raw()) && keep.contains(&r.target_id.raw()));
    doc.issue_label_mappings.retain(|m| keep.contains(&m.issue_id));
    doc.issue_file_mappings.retain(|m| keep.contains(&m.issue_id));

    let referenced: HashSet<i64> = doc.issue_label_mappings.iter().map(|m| m.label_id).collect();
    doc.labels.retain(|l| referenced.contains(&l.id));
}

/// Resolves each issue's label names from the document's mapping rows.
fn label_names(doc: &ExportDocument) -> HashMap<i64, Vec<String>> {
    let by_id: HashMap<i64, &str> = doc
        .labels
        .iter()
        .map(|l| (l.id, l.name.as_str()))
        .collect();
    let mut names: HashMap<i64, Vec<String>> = HashMap::new();
    for mapping in &doc.issue_label_mappings {
        if let Some(name) = by_id.get(&mapping.label_id) {
            names
                .entry(mapping.issue_id)
                .or_default()
                .push((*name).to_string());
        }
    }
    names
}

fn render_csv(doc: &ExportDocument) -> String {
    let names = label_names(doc);
    let mut files: HashMap<i64, Vec<String>> = HashMap::new();
    for mapping in &doc.issue_file_mappings {
        files
            .entry(mapping.issue_id)
            .or_default()
            .push(mapping.file_path.clone());
    }

    let mut lines = vec![
        "id,parent_id,title,description,status,priority,type,assignee,labels,files,created_at,updated_at"
            .to_string(),
    ];
    for issue in &doc.issues {
        let row = [
            issue.id.to_string(),
            issue.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            issue.title.clone(),
            issue.description.clone(),
            issue.status.to_string(),
            issue.priority.to_string(),
            issue.kind.to_string(),
            issue.assignee.clone(),
            names
                .get(&issue.id.raw())
                .map(|n| n.join(";"))
                .unwrap_or_default(),
            files
                .get(&issue.id.raw())
                .map(|f| f.join(";"))
                .unwrap_or_default(),
            time::format_ts(&issue.created_at),
            time::format_ts(&issue.updated_at),
        ];
        let escaped: Vec<String> = row.iter().map(|cell| csv_escape(cell)).collect();
        lines.push(escaped.join(","));
    }
    lines.join("\n")
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn render_markdown(doc: &ExportDocument) -> String {
    let names = label_names(doc);
    let mut lines = vec![
        "# Docket export".to_string(),
        String::new(),
        format!("Exported: {}", time::format_ts(&doc.exported_at)),
        String::new(),
        "| ID | Title | Status | Priority | Type | Assignee | Labels |".to_string(),
        "|----|-------|--------|----------|------|----------|--------|".to_string(),
    ];
    for issue in &doc.issues {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} |",
            issue.id,
            issue.title.replace('|', "\\|"),
            issue.status,
            issue.priority,
            issue.kind,
            issue.assignee,
            names
                .get(&issue.id.raw())
                .map(|n| n.join(", "))
                .unwrap_or_default(),
        ));
    }
    lines.join("\n")
}
