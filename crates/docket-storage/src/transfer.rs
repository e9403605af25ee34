//! Export/import of the full database as a versioned JSON document.
//!
//! The document carries issues with `DKT-N` ids (including `parent_id`),
//! while mapping rows use the raw integer ids they join on. Collections
//! always serialize as arrays, never null. Only JSON round-trips; CSV and
//! Markdown renderings live in the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docket_core::entity::{Comment, Label, Relation};
use docket_core::enums::{Kind, Priority, RelationType, Status};
use docket_core::issue::Issue;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::import;
use crate::sqlite::store::Store;

/// Version of the export document format.
pub const EXPORT_VERSION: u32 = 1;

/// An `(issue, label)` link row. Raw integer ids, matching storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabelMapping {
    pub issue_id: i64,
    pub label_id: i64,
}

/// An `(issue, file path)` attachment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFileMapping {
    pub issue_id: i64,
    pub file_path: String,
}

/// The versioned full-database document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: u32,
    #[serde(with = "time::timestamp")]
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub issue_label_mappings: Vec<IssueLabelMapping>,
    #[serde(default)]
    pub issue_file_mappings: Vec<IssueFileMapping>,
}

/// How an import treats existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Fail with a conflict if any issue exists (the default).
    RequireEmpty,
    /// Insert-or-ignore by primary key; duplicates count as skipped.
    Merge,
    /// Clear all data first, then import.
    Replace,
}

/// Row tallies reported by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub imported: usize,
    pub skipped: usize,
}

impl ImportCounts {
    fn tally(&mut self, inserted: bool) {
        if inserted {
            self.imported += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Snapshots the entire database into a document.
pub fn export_document(store: &Store) -> Result<ExportDocument> {
    Ok(ExportDocument {
        version: EXPORT_VERSION,
        exported_at: time::now(),
        issues: store.list_all_issues()?,
        comments: store.list_all_comments()?,
        relations: store.get_all_relations()?,
        labels: store.list_all_labels_raw()?,
        issue_label_mappings: store
            .list_all_label_mappings()?
            .into_iter()
            .map(|(issue_id, label_id)| IssueLabelMapping { issue_id, label_id })
            .collect(),
        issue_file_mappings: store
            .list_all_file_mappings()?
            .into_iter()
            .map(|(issue_id, file_path)| IssueFileMapping {
                issue_id,
                file_path,
            })
            .collect(),
    })
}

/// Parses and validates a document from JSON.
///
/// All enum and version problems are collected into one validation error
/// before any typed deserialization, so a bad file reports everything
/// wrong with it at once.
pub fn parse_document(json: &str) -> Result<ExportDocument> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let mut errors: Vec<String> = Vec::new();

    match value.get("version").and_then(|v| v.as_u64()) {
        Some(v) if v == u64::from(EXPORT_VERSION) => {}
        Some(v) => errors.push(format!("unsupported document version {v} (expected {EXPORT_VERSION})")),
        None => errors.push("missing document version".to_string()),
    }

    if let Some(issues) = value.get("issues").and_then(|v| v.as_array()) {
        for (idx, issue) in issues.iter().enumerate() {
            check_enum::<Status>(issue, "status", idx, "issue", &mut errors);
            check_enum::<Priority>(issue, "priority", idx, "issue", &mut errors);
            check_enum::<Kind>(issue, "type", idx, "issue", &mut errors);
        }
    }
    if let Some(relations) = value.get("relations").and_then(|v| v.as_array()) {
        for (idx, relation) in relations.iter().enumerate() {
            check_enum::<RelationType>(relation, "relation_type", idx, "relation", &mut errors);
        }
    }

    if !errors.is_empty() {
        return Err(StoreError::validation(errors.join("; ")));
    }

    Ok(serde_json::from_value(value)?)
}

/// Validates one string-typed enum field on a document row.
fn check_enum<T>(
    row: &serde_json::Value,
    field: &str,
    idx: usize,
    entity: &str,
    errors: &mut Vec<String>,
)
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = row.get(field).and_then(|v| v.as_str()) {
        if let Err(e) = raw.parse::<T>() {
            errors.push(format!("{entity} {idx}: {e}"));
        }
    }
}

/// Applies a document to the store in one transaction.
///
/// Insertion order is FK-safe: labels, then issues with parents stashed,
/// then the parent links for rows inserted this pass, then the mapping
/// tables, comments, and relations. Every insert is insert-or-ignore and
/// contributes to the returned counts.
pub fn import_document(
    store: &Store,
    doc: &ExportDocument,
    mode: ImportMode,
) -> Result<ImportCounts> {
    let conn = store.lock_conn()?;
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
    match mode {
        ImportMode::RequireEmpty if existing > 0 => {
            return Err(StoreError::conflict(
                "database already contains issues (use --merge or --replace)",
            ));
        }
        ImportMode::Replace => import::clear_all_data_on_conn(&tx)?,
        _ => {}
    }

    let mut counts = ImportCounts::default();

    for label in &doc.labels {
        counts.tally(import::insert_label_on_conn(&tx, label)?);
    }

    // Issues land with a NULL parent; the original parent is stashed for
    // each row inserted this pass. Skipped duplicates are not re-parented.
    let mut parent_stash: Vec<(i64, i64)> = Vec::new();
    for issue in &doc.issues {
        let inserted = import::insert_issue_on_conn(&tx, issue)?;
        if inserted {
            if let Some(parent) = issue.parent_id {
                parent_stash.push((issue.id.raw(), parent.raw()));
            }
        }
        counts.tally(inserted);
    }
    for (issue_id, parent_id) in parent_stash {
        import::set_issue_parent_on_conn(&tx, issue_id, parent_id)?;
    }

    for mapping in &doc.issue_label_mappings {
        counts.tally(import::insert_issue_label_mapping_on_conn(
            &tx,
            mapping.issue_id,
            mapping.label_id,
        )?);
    }
    for mapping in &doc.issue_file_mappings {
        counts.tally(import::insert_file_mapping_on_conn(
            &tx,
            mapping.issue_id,
            &mapping.file_path,
        )?);
    }
    for comment in &doc.comments {
        counts.tally(import::insert_comment_on_conn(&tx, comment)?);
    }
    for relation in &doc.relations {
        counts.tally(import::insert_relation_on_conn(&tx, relation)?);
    }

    tx.commit()
        .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
    Ok(counts)
}
