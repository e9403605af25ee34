//! Bulk insert-or-ignore helpers backing the transfer module.
//!
//! Every helper returns whether the row was actually inserted so the
//! import path can tally `imported` vs `skipped` without relying on
//! errors to detect duplicates.

use rusqlite::{Connection, params};

use docket_core::entity::{Comment, Label, Relation};
use docket_core::issue::Issue;
use docket_core::time;

use crate::error::Result;
use crate::sqlite::store::Store;

/// Inserts an issue with its original id and a NULL parent.
///
/// Parents are restored in a second pass once every issue row exists, so
/// document ordering never trips the foreign key.
pub(crate) fn insert_issue_on_conn(conn: &Connection, issue: &Issue) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO issues
         (id, parent_id, title, description, status, priority, kind, assignee, created_at, updated_at)
         VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            issue.id.raw(),
            issue.title,
            issue.description,
            issue.status.as_str(),
            issue.priority.as_str(),
            issue.kind.as_str(),
            issue.assignee,
            time::format_ts(&issue.created_at),
            time::format_ts(&issue.updated_at),
        ],
    )?;
    Ok(affected > 0)
}

/// Restores a stashed parent link on an issue inserted this pass.
pub(crate) fn set_issue_parent_on_conn(
    conn: &Connection,
    issue_id: i64,
    parent_id: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE issues SET parent_id = ?1 WHERE id = ?2",
        params![parent_id, issue_id],
    )?;
    Ok(())
}

/// Inserts a label with its original id.
pub(crate) fn insert_label_on_conn(conn: &Connection, label: &Label) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO labels (id, name, color) VALUES (?1, ?2, ?3)",
        params![label.id, label.name, label.color],
    )?;
    Ok(affected > 0)
}

/// Inserts an issue-label link.
pub(crate) fn insert_issue_label_mapping_on_conn(
    conn: &Connection,
    issue_id: i64,
    label_id: i64,
) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO issue_labels (issue_id, label_id) VALUES (?1, ?2)",
        params![issue_id, label_id],
    )?;
    Ok(affected > 0)
}

/// Inserts an issue-file mapping.
pub(crate) fn insert_file_mapping_on_conn(
    conn: &Connection,
    issue_id: i64,
    file_path: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO issue_files (issue_id, file_path) VALUES (?1, ?2)",
        params![issue_id, file_path],
    )?;
    Ok(affected > 0)
}

/// Inserts a comment with its original id and timestamp.
pub(crate) fn insert_comment_on_conn(conn: &Connection, comment: &Comment) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO comments (id, issue_id, body, author, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comment.id,
            comment.issue_id.raw(),
            comment.body,
            comment.author,
            time::format_ts(&comment.created_at),
        ],
    )?;
    Ok(affected > 0)
}

/// Inserts a relation with its original id. The inverse-duplicate trigger
/// silently drops conflicting rows, which also reads as "not inserted".
pub(crate) fn insert_relation_on_conn(conn: &Connection, relation: &Relation) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO issue_relations
         (id, source_issue_id, target_issue_id, relation_type, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            relation.id,
            relation.source_id.raw(),
            relation.target_id.raw(),
            relation.relation_type.as_str(),
            time::format_ts(&relation.created_at),
        ],
    )?;
    Ok(affected > 0)
}

/// Deletes every row in dependency order. Schema and meta survive; the
/// autoincrement bookkeeping is reset so a cleared database numbers from 1.
pub(crate) fn clear_all_data_on_conn(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM activity_log;
         DELETE FROM issue_files;
         DELETE FROM issue_labels;
         DELETE FROM issue_relations;
         DELETE FROM comments;
         DELETE FROM issues;
         DELETE FROM labels;
         DELETE FROM sqlite_sequence
          WHERE name IN ('issues', 'comments', 'labels', 'issue_relations', 'activity_log');",
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Store wrappers (single-row import contract)
// ---------------------------------------------------------------------------

impl Store {
    /// Inserts an issue with its original id (parent not restored).
    pub fn insert_issue_with_id(&self, issue: &Issue) -> Result<bool> {
        let conn = self.lock_conn()?;
        insert_issue_on_conn(&conn, issue)
    }

    /// Inserts a label with its original id.
    pub fn insert_label_with_id(&self, label: &Label) -> Result<bool> {
        let conn = self.lock_conn()?;
        insert_label_on_conn(&conn, label)
    }

    /// Inserts an issue-label link by raw ids.
    pub fn insert_issue_label_mapping(&self, issue_id: i64, label_id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        insert_issue_label_mapping_on_conn(&conn, issue_id, label_id)
    }

    /// Inserts an issue-file mapping by raw id and path.
    pub fn insert_issue_file_mapping(&self, issue_id: i64, file_path: &str) -> Result<bool> {
        let conn = self.lock_conn()?;
        insert_file_mapping_on_conn(&conn, issue_id, file_path)
    }

    /// Returns every `(issue_id, label_id)` link (export path).
    pub fn list_all_label_mappings(&self) -> Result<Vec<(i64, i64)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT issue_id, label_id FROM issue_labels ORDER BY issue_id, label_id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut mappings = Vec::new();
        for row in rows {
            mappings.push(row?);
        }
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::issue::IssueBuilder;

    #[test]
    fn insert_with_id_reports_duplicates() {
        let store = Store::open_in_memory().unwrap();
        let issue = IssueBuilder::new("Imported")
            .id("DKT-7".parse().unwrap())
            .build();

        assert!(store.insert_issue_with_id(&issue).unwrap());
        assert!(!store.insert_issue_with_id(&issue).unwrap());

        let loaded = store.get_issue("DKT-7".parse().unwrap()).unwrap();
        assert_eq!(loaded.title, "Imported");
    }

    #[test]
    fn label_mapping_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let issue = IssueBuilder::new("A").id("DKT-1".parse().unwrap()).build();
        store.insert_issue_with_id(&issue).unwrap();
        let label = docket_core::entity::Label {
            id: 5,
            name: "infra".into(),
            color: None,
        };
        assert!(store.insert_label_with_id(&label).unwrap());
        assert!(store.insert_issue_label_mapping(1, 5).unwrap());
        assert!(!store.insert_issue_label_mapping(1, 5).unwrap());

        assert_eq!(store.list_all_label_mappings().unwrap(), vec![(1, 5)]);
    }
}
