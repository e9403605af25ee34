//! File attachment operations for [`Store`].
//!
//! Only paths are stored, never blobs. Attachments have set semantics per
//! issue and read back sorted alphabetically.

use rusqlite::{Connection, params};

use docket_core::id::IssueId;
use docket_core::issue::Issue;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::activity::{ensure_issue_exists, record_activity};
use crate::sqlite::store::Store;

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Returns the file paths attached to an issue, sorted.
pub(crate) fn get_files_on_conn(conn: &Connection, issue_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT file_path FROM issue_files WHERE issue_id = ?1 ORDER BY file_path")?;
    let rows = stmt.query_map(params![issue_id], |row| row.get(0))?;
    let mut files = Vec::new();
    for row in rows {
        files.push(row?);
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Store methods
// ---------------------------------------------------------------------------

impl Store {
    /// Attaches file paths to an issue (duplicates skipped), recording a
    /// `file_added` activity row per new path. Returns how many were new.
    pub fn attach_files(&self, issue_id: IssueId, paths: &[String], author: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, issue_id)?;
        let now = time::format_ts(&time::now());
        let mut added = 0;

        for path in paths {
            let affected = tx.execute(
                "INSERT OR IGNORE INTO issue_files (issue_id, file_path) VALUES (?1, ?2)",
                params![issue_id.raw(), path],
            )?;
            if affected > 0 {
                record_activity(
                    &tx,
                    issue_id.raw(),
                    "file_added",
                    None,
                    Some(path.as_str()),
                    author,
                    &now,
                )?;
                added += 1;
            }
        }

        if added > 0 {
            tx.execute(
                "UPDATE issues SET updated_at = ?1 WHERE id = ?2",
                params![now, issue_id.raw()],
            )?;
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(added)
    }

    /// Detaches file paths from an issue. A path that is not attached is
    /// `NotFound`.
    pub fn detach_files(&self, issue_id: IssueId, paths: &[String], author: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, issue_id)?;
        let now = time::format_ts(&time::now());

        for path in paths {
            let affected = tx.execute(
                "DELETE FROM issue_files WHERE issue_id = ?1 AND file_path = ?2",
                params![issue_id.raw(), path],
            )?;
            if affected == 0 {
                return Err(StoreError::not_found("file", path));
            }
            record_activity(
                &tx,
                issue_id.raw(),
                "file_removed",
                Some(path.as_str()),
                None,
                author,
                &now,
            )?;
        }

        if !paths.is_empty() {
            tx.execute(
                "UPDATE issues SET updated_at = ?1 WHERE id = ?2",
                params![now, issue_id.raw()],
            )?;
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// Replaces an issue's file set, recording the diff as activity.
    pub fn set_issue_files(&self, issue_id: IssueId, paths: &[String], author: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, issue_id)?;
        let current = get_files_on_conn(&tx, issue_id.raw())?;
        let next: std::collections::BTreeSet<&str> = paths.iter().map(String::as_str).collect();
        let now = time::format_ts(&time::now());
        let mut touched = false;

        for path in &current {
            if !next.contains(path.as_str()) {
                tx.execute(
                    "DELETE FROM issue_files WHERE issue_id = ?1 AND file_path = ?2",
                    params![issue_id.raw(), path],
                )?;
                record_activity(
                    &tx,
                    issue_id.raw(),
                    "file_removed",
                    Some(path.as_str()),
                    None,
                    author,
                    &now,
                )?;
                touched = true;
            }
        }
        for &path in &next {
            let affected = tx.execute(
                "INSERT OR IGNORE INTO issue_files (issue_id, file_path) VALUES (?1, ?2)",
                params![issue_id.raw(), path],
            )?;
            if affected > 0 {
                record_activity(
                    &tx,
                    issue_id.raw(),
                    "file_added",
                    None,
                    Some(path),
                    author,
                    &now,
                )?;
                touched = true;
            }
        }

        if touched {
            tx.execute(
                "UPDATE issues SET updated_at = ?1 WHERE id = ?2",
                params![now, issue_id.raw()],
            )?;
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// Returns the sorted file paths attached to an issue.
    pub fn get_issue_files(&self, issue_id: IssueId) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, issue_id)?;
        get_files_on_conn(&conn, issue_id.raw())
    }

    /// Populates `files` on a batch of issues with a single query.
    pub fn hydrate_files(&self, issues: &mut [Issue]) -> Result<()> {
        if issues.is_empty() {
            return Ok(());
        }
        let conn = self.lock_conn()?;
        let placeholders = issues.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT issue_id, file_path FROM issue_files
             WHERE issue_id IN ({placeholders})
             ORDER BY file_path"
        );
        let raw_ids: Vec<i64> = issues.iter().map(|i| i.id.raw()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(raw_ids.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut by_issue: std::collections::HashMap<i64, Vec<String>> =
            std::collections::HashMap::new();
        for row in rows {
            let (issue_id, path) = row?;
            by_issue.entry(issue_id).or_default().push(path);
        }
        for issue in issues.iter_mut() {
            issue.files = by_issue.remove(&issue.id.raw()).unwrap_or_default();
        }
        Ok(())
    }

    /// Returns every `(issue_id, file_path)` mapping (export path).
    pub fn list_all_file_mappings(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn
            .prepare("SELECT issue_id, file_path FROM issue_files ORDER BY issue_id, file_path")?;
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

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn create(store: &Store, title: &str) -> IssueId {
        store
            .create_issue(&IssueBuilder::new(title).build(), "alice")
            .unwrap()
    }

    #[test]
    fn attach_is_a_set_and_sorted() {
        let store = test_store();
        let id = create(&store, "A");
        let added = store
            .attach_files(
                id,
                &["src/z.rs".into(), "src/a.rs".into(), "src/z.rs".into()],
                "alice",
            )
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            store.get_issue_files(id).unwrap(),
            vec!["src/a.rs", "src/z.rs"]
        );
    }

    #[test]
    fn detach_missing_path() {
        let store = test_store();
        let id = create(&store, "A");
        let err = store
            .detach_files(id, &["src/ghost.rs".into()], "alice")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn set_records_diff() {
        let store = test_store();
        let id = create(&store, "A");
        store
            .attach_files(id, &["a.rs".into(), "b.rs".into()], "alice")
            .unwrap();
        store
            .set_issue_files(id, &["b.rs".into(), "c.rs".into()], "alice")
            .unwrap();

        assert_eq!(store.get_issue_files(id).unwrap(), vec!["b.rs", "c.rs"]);

        let activity = store.list_activity(id).unwrap();
        let removed: Vec<_> = activity
            .iter()
            .filter(|a| a.field_changed == "file_removed")
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].old_value.as_deref(), Some("a.rs"));
        let added: Vec<_> = activity
            .iter()
            .filter(|a| a.field_changed == "file_added" && a.new_value.as_deref() == Some("c.rs"))
            .collect();
        assert_eq!(added.len(), 1);
    }

    #[test]
    fn hydrate_files_bulk() {
        let store = test_store();
        let a = create(&store, "A");
        let b = create(&store, "B");
        store.attach_files(a, &["x.rs".into()], "alice").unwrap();

        let mut issues = vec![store.get_issue(a).unwrap(), store.get_issue(b).unwrap()];
        issues.iter_mut().for_each(|i| i.files.clear());
        store.hydrate_files(&mut issues).unwrap();
        assert_eq!(issues[0].files, vec!["x.rs"]);
        assert!(issues[1].files.is_empty());
    }
}
