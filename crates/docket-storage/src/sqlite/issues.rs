//! Issue CRUD operations for [`Store`].

use std::collections::HashMap;

use rusqlite::{Connection, Row, params};

use docket_core::enums::{Kind, Priority, Status};
use docket_core::id::IssueId;
use docket_core::issue::Issue;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::activity::{ensure_issue_exists, record_activity};
use crate::sqlite::files::get_files_on_conn;
use crate::sqlite::labels::{find_or_create_label_on_conn, get_labels_on_conn, hydrate_labels};
use crate::sqlite::store::Store;

/// All issue columns in a deterministic order for SELECT queries.
pub(crate) const ISSUE_COLUMNS: &str =
    "id, parent_id, title, description, status, priority, kind, assignee, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

/// Deserialises a row into an [`Issue`]. Labels and files are not hydrated.
pub(crate) fn scan_issue(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let raw_id: i64 = row.get("id")?;
    let raw_parent: Option<i64> = row.get("parent_id")?;
    let status_str: String = row.get("status")?;
    let priority_str: String = row.get("priority")?;
    let kind_str: String = row.get("kind")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    Ok(Issue {
        id: IssueId::new(raw_id).expect("stored issue ids are positive"),
        parent_id: raw_parent.and_then(IssueId::new),
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_enum_column(&status_str)?,
        priority: parse_enum_column(&priority_str)?,
        kind: parse_enum_column(&kind_str)?,
        assignee: row.get("assignee")?,
        labels: Vec::new(),
        files: Vec::new(),
        created_at: time::parse_ts(&created_at_str),
        updated_at: time::parse_ts(&updated_at_str),
    })
}

/// Parses a stored enum column, surfacing corruption as a conversion error.
fn parse_enum_column<T>(s: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// Connection-level helpers (shared with transactions)
// ---------------------------------------------------------------------------

/// Retrieves a single issue row (no hydration) on the given connection.
pub(crate) fn get_issue_on_conn(conn: &Connection, id: IssueId) -> Result<Issue> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    conn.query_row(&sql, params![id.raw()], scan_issue)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("issue", id),
            other => StoreError::Query(other),
        })
}

/// Returns `true` if `candidate` is a descendant of `issue_id` in the
/// parent tree. Uses a recursive CTE.
pub(crate) fn is_descendant_on_conn(
    conn: &Connection,
    issue_id: IssueId,
    candidate: IssueId,
) -> Result<bool> {
    let found: bool = conn.query_row(
        "WITH RECURSIVE descendants(id) AS (
             SELECT id FROM issues WHERE parent_id = ?1
             UNION
             SELECT i.id FROM issues i JOIN descendants d ON i.parent_id = d.id
         )
         SELECT EXISTS(SELECT 1 FROM descendants WHERE id = ?2)",
        params![issue_id.raw(), candidate.raw()],
        |row| row.get(0),
    )?;
    Ok(found)
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// Partial update for an issue. `None` fields are left untouched.
///
/// The field set doubles as the update allowlist: anything not represented
/// here cannot be changed through [`Store::update_issue`].
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub kind: Option<Kind>,
    pub assignee: Option<String>,
    /// Outer `Some` means "update"; the inner `None` clears the parent.
    pub parent_id: Option<Option<IssueId>>,
}

impl IssueChanges {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.kind.is_none()
            && self.assignee.is_none()
            && self.parent_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Store methods
// ---------------------------------------------------------------------------

impl Store {
    /// Creates an issue together with its labels and files, records the
    /// `created` activity, and returns the assigned id.
    pub fn create_issue(&self, issue: &Issue, author: &str) -> Result<IssueId> {
        if issue.title.trim().is_empty() {
            return Err(StoreError::validation("title must not be empty"));
        }

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        if let Some(parent) = issue.parent_id {
            ensure_issue_exists(&tx, parent)?;
        }

        let now = time::format_ts(&time::now());
        tx.execute(
            "INSERT INTO issues (parent_id, title, description, status, priority, kind, assignee, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                issue.parent_id.map(IssueId::raw),
                issue.title,
                issue.description,
                issue.status.as_str(),
                issue.priority.as_str(),
                issue.kind.as_str(),
                issue.assignee,
                now,
            ],
        )?;
        let raw_id = tx.last_insert_rowid();
        let id = IssueId::new(raw_id).expect("rowid is positive");

        for name in &issue.labels {
            let label_id = find_or_create_label_on_conn(&tx, name, None)?;
            tx.execute(
                "INSERT OR IGNORE INTO issue_labels (issue_id, label_id) VALUES (?1, ?2)",
                params![raw_id, label_id],
            )?;
        }

        for path in &issue.files {
            tx.execute(
                "INSERT OR IGNORE INTO issue_files (issue_id, file_path) VALUES (?1, ?2)",
                params![raw_id, path],
            )?;
        }

        record_activity(&tx, raw_id, "created", None, None, author, &now)?;

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(id)
    }

    /// Retrieves an issue by id, with labels and files hydrated.
    pub fn get_issue(&self, id: IssueId) -> Result<Issue> {
        let conn = self.lock_conn()?;
        let mut issue = get_issue_on_conn(&conn, id)?;
        issue.labels = get_labels_on_conn(&conn, id.raw())?;
        issue.files = get_files_on_conn(&conn, id.raw())?;
        Ok(issue)
    }

    /// Retrieves multiple issues in a single query, labels hydrated.
    ///
    /// Missing ids are simply absent from the returned map.
    pub fn get_issues_by_ids(&self, ids: &[IssueId]) -> Result<HashMap<i64, Issue>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.lock_conn()?;
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.raw()).collect();
        let rows = stmt.query_map(rusqlite::params_from_iter(raw_ids.iter()), scan_issue)?;

        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        hydrate_labels(&conn, &mut issues)?;

        Ok(issues.into_iter().map(|i| (i.id.raw(), i)).collect())
    }

    /// Applies a partial update, recording one activity row per changed
    /// field and refreshing `updated_at`.
    pub fn update_issue(&self, id: IssueId, changes: &IssueChanges, author: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        let current = get_issue_on_conn(&tx, id)?;

        // Reparenting must not create a cycle in the parent chain.
        if let Some(new_parent) = &changes.parent_id {
            if let Some(parent) = new_parent {
                if *parent == id {
                    return Err(StoreError::validation(format!(
                        "{id} cannot be its own parent"
                    )));
                }
                ensure_issue_exists(&tx, *parent)?;
                if is_descendant_on_conn(&tx, id, *parent)? {
                    return Err(StoreError::conflict(format!(
                        "moving {id} under {parent} would create a cycle"
                    )));
                }
            }
        }

        let mut set_clauses: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        // (field, old, new) triples written to the activity log.
        let mut changed: Vec<(&str, Option<String>, Option<String>)> = Vec::new();

        if let Some(ref title) = changes.title {
            if title.trim().is_empty() {
                return Err(StoreError::validation("title must not be empty"));
            }
            if *title != current.title {
                set_clauses.push("title = ?".into());
                param_values.push(Box::new(title.clone()));
                changed.push(("title", Some(current.title.clone()), Some(title.clone())));
            }
        }
        if let Some(ref description) = changes.description {
            if *description != current.description {
                set_clauses.push("description = ?".into());
                param_values.push(Box::new(description.clone()));
                changed.push((
                    "description",
                    Some(current.description.clone()),
                    Some(description.clone()),
                ));
            }
        }
        if let Some(status) = changes.status {
            if status != current.status {
                set_clauses.push("status = ?".into());
                param_values.push(Box::new(status.as_str()));
                changed.push((
                    "status",
                    Some(current.status.as_str().into()),
                    Some(status.as_str().into()),
                ));
            }
        }
        if let Some(priority) = changes.priority {
            if priority != current.priority {
                set_clauses.push("priority = ?".into());
                param_values.push(Box::new(priority.as_str()));
                changed.push((
                    "priority",
                    Some(current.priority.as_str().into()),
                    Some(priority.as_str().into()),
                ));
            }
        }
        if let Some(kind) = changes.kind {
            if kind != current.kind {
                set_clauses.push("kind = ?".into());
                param_values.push(Box::new(kind.as_str()));
                changed.push((
                    "type",
                    Some(current.kind.as_str().into()),
                    Some(kind.as_str().into()),
                ));
            }
        }
        if let Some(ref assignee) = changes.assignee {
            if *assignee != current.assignee {
                set_clauses.push("assignee = ?".into());
                param_values.push(Box::new(assignee.clone()));
                changed.push((
                    "assignee",
                    Some(current.assignee.clone()),
                    Some(assignee.clone()),
                ));
            }
        }
        if let Some(ref new_parent) = changes.parent_id {
            if *new_parent != current.parent_id {
                set_clauses.push("parent_id = ?".into());
                param_values.push(Box::new(new_parent.map(IssueId::raw)));
                changed.push((
                    "parent_id",
                    current.parent_id.map(|p| p.raw().to_string()),
                    new_parent.map(|p| p.raw().to_string()),
                ));
            }
        }

        if set_clauses.is_empty() {
            // Nothing actually changed; updated_at stays put.
            return Ok(());
        }

        let now = time::format_ts(&time::now());
        set_clauses.push("updated_at = ?".into());
        param_values.push(Box::new(now.clone()));

        let sql = format!("UPDATE issues SET {} WHERE id = ?", set_clauses.join(", "));
        param_values.push(Box::new(id.raw()));
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        tx.execute(&sql, param_refs.as_slice())?;

        for (field, old, new) in &changed {
            record_activity(
                &tx,
                id.raw(),
                field,
                old.as_deref(),
                new.as_deref(),
                author,
                &now,
            )?;
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// Deletes an issue. Comments, label links, files, relations, and
    /// activity cascade; children are orphaned by the set-null constraint.
    pub fn delete_issue(&self, id: IssueId) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        let affected = tx.execute("DELETE FROM issues WHERE id = ?1", params![id.raw()])?;
        if affected == 0 {
            return Err(StoreError::not_found("issue", id));
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// Deletes an issue and every descendant in one statement.
    ///
    /// Returns the number of issues removed.
    pub fn cascade_delete_issue(&self, id: IssueId) -> Result<usize> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, id)?;
        let affected = tx.execute(
            "WITH RECURSIVE descendants(id) AS (
                 SELECT id FROM issues WHERE id = ?1
                 UNION
                 SELECT i.id FROM issues i JOIN descendants d ON i.parent_id = d.id
             )
             DELETE FROM issues WHERE id IN (SELECT id FROM descendants)",
            params![id.raw()],
        )?;

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(affected)
    }

    /// Clears `parent_id` on every direct child, recording a `parent_id`
    /// activity row per child. Returns the orphaned ids.
    pub fn orphan_sub_issues(&self, parent: IssueId, author: &str) -> Result<Vec<IssueId>> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, parent)?;

        let children: Vec<i64> = {
            let mut stmt =
                tx.prepare("SELECT id FROM issues WHERE parent_id = ?1 ORDER BY id ASC")?;
            let rows = stmt.query_map(params![parent.raw()], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let now = time::format_ts(&time::now());
        let old = parent.raw().to_string();
        for child in &children {
            tx.execute(
                "UPDATE issues SET parent_id = NULL, updated_at = ?1 WHERE id = ?2",
                params![now, child],
            )?;
            record_activity(&tx, *child, "parent_id", Some(old.as_str()), None, author, &now)?;
        }

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(children
            .into_iter()
            .filter_map(IssueId::new)
            .collect())
    }

    /// Returns the direct children of an issue, labels hydrated.
    pub fn get_sub_issues(&self, parent: IssueId) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, parent)?;
        let sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE parent_id = ?1 ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent.raw()], scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        hydrate_labels(&conn, &mut issues)?;
        Ok(issues)
    }

    /// Returns every descendant of an issue (excluding the issue itself),
    /// labels hydrated, ordered by id.
    pub fn get_sub_issue_tree(&self, parent: IssueId) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, parent)?;
        let sql = format!(
            "WITH RECURSIVE descendants(id) AS (
                 SELECT id FROM issues WHERE parent_id = ?1
                 UNION
                 SELECT i.id FROM issues i JOIN descendants d ON i.parent_id = d.id
             )
             SELECT {ISSUE_COLUMNS} FROM issues
             WHERE id IN (SELECT id FROM descendants)
             ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent.raw()], scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        hydrate_labels(&conn, &mut issues)?;
        Ok(issues)
    }

    /// Returns `(done, total)` for the direct children of an issue.
    pub fn get_sub_issue_progress(&self, parent: IssueId) -> Result<(i64, i64)> {
        let conn = self.lock_conn()?;
        let row = conn.query_row(
            "SELECT COALESCE(SUM(status = 'done'), 0), COUNT(*)
             FROM issues WHERE parent_id = ?1",
            params![parent.raw()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(row)
    }

    /// Batch variant of [`Store::get_sub_issue_progress`]: one query for
    /// any number of parents. Parents without children map to `(0, 0)`.
    pub fn get_batch_sub_issue_progress(
        &self,
        parents: &[IssueId],
    ) -> Result<HashMap<i64, (i64, i64)>> {
        let mut progress: HashMap<i64, (i64, i64)> =
            parents.iter().map(|p| (p.raw(), (0, 0))).collect();
        if parents.is_empty() {
            return Ok(progress);
        }

        let conn = self.lock_conn()?;
        let placeholders = parents.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT parent_id, COALESCE(SUM(status = 'done'), 0), COUNT(*)
             FROM issues WHERE parent_id IN ({placeholders})
             GROUP BY parent_id"
        );
        let raw: Vec<i64> = parents.iter().map(|p| p.raw()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(raw.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        for row in rows {
            let (parent, done, total) = row?;
            progress.insert(parent, (done, total));
        }
        Ok(progress)
    }

    /// Returns `true` if `candidate` is a descendant of `issue_id`.
    pub fn is_descendant(&self, issue_id: IssueId, candidate: IssueId) -> Result<bool> {
        let conn = self.lock_conn()?;
        is_descendant_on_conn(&conn, issue_id, candidate)
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
    fn create_and_read() {
        let store = test_store();
        let id = create(&store, "First");
        assert_eq!(id.raw(), 1);

        let issue = store.get_issue(id).unwrap();
        assert_eq!(issue.id, id);
        assert_eq!(issue.status, Status::Backlog);
        assert_eq!(issue.priority, Priority::None);
        assert!(issue.labels.is_empty());
        assert_eq!(issue.created_at, issue.updated_at);

        let activity = store.list_activity(id).unwrap();
        assert!(activity.iter().any(|a| a.field_changed == "created"));
    }

    #[test]
    fn ids_are_monotonic() {
        let store = test_store();
        assert_eq!(create(&store, "a").raw(), 1);
        assert_eq!(create(&store, "b").raw(), 2);
        store.delete_issue("DKT-2".parse().unwrap()).unwrap();
        assert_eq!(create(&store, "c").raw(), 3);
    }

    #[test]
    fn create_rejects_empty_title() {
        let store = test_store();
        let err = store
            .create_issue(&IssueBuilder::new("  ").build(), "alice")
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn create_with_labels_and_files() {
        let store = test_store();
        let issue = IssueBuilder::new("Tagged")
            .labels(vec!["backend".into(), "urgent".into()])
            .files(vec!["src/main.rs".into(), "src/lib.rs".into()])
            .build();
        let id = store.create_issue(&issue, "alice").unwrap();

        let loaded = store.get_issue(id).unwrap();
        assert_eq!(loaded.labels, vec!["backend", "urgent"]);
        // Files come back sorted.
        assert_eq!(loaded.files, vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn create_with_missing_parent() {
        let store = test_store();
        let issue = IssueBuilder::new("Child")
            .parent("DKT-42".parse().unwrap())
            .build();
        let err = store.create_issue(&issue, "alice").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_records_activity_per_field() {
        let store = test_store();
        let id = create(&store, "First");

        store
            .update_issue(
                id,
                &IssueChanges {
                    status: Some(Status::Done),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap();
        store
            .update_issue(
                id,
                &IssueChanges {
                    status: Some(Status::Backlog),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap();

        let issue = store.get_issue(id).unwrap();
        assert_eq!(issue.status, Status::Backlog);

        let status_changes: Vec<_> = store
            .list_activity(id)
            .unwrap()
            .into_iter()
            .filter(|a| a.field_changed == "status")
            .collect();
        assert_eq!(status_changes.len(), 2);
        assert_eq!(status_changes[0].old_value.as_deref(), Some("backlog"));
        assert_eq!(status_changes[0].new_value.as_deref(), Some("done"));
        assert_eq!(status_changes[1].old_value.as_deref(), Some("done"));
        assert_eq!(status_changes[1].new_value.as_deref(), Some("backlog"));
    }

    #[test]
    fn update_noop_leaves_updated_at() {
        let store = test_store();
        let id = create(&store, "First");
        let before = store.get_issue(id).unwrap();

        store
            .update_issue(
                id,
                &IssueChanges {
                    status: Some(Status::Backlog),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap();

        let after = store.get_issue(id).unwrap();
        assert_eq!(before.updated_at, after.updated_at);
        let activity = store.list_activity(id).unwrap();
        assert_eq!(activity.len(), 1, "only the created entry");
    }

    #[test]
    fn reparent_to_self_rejected() {
        let store = test_store();
        let id = create(&store, "Solo");
        let err = store
            .update_issue(
                id,
                &IssueChanges {
                    parent_id: Some(Some(id)),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn reparent_to_descendant_rejected() {
        let store = test_store();
        let p = create(&store, "Parent");
        let c = store
            .create_issue(&IssueBuilder::new("Child").parent(p).build(), "alice")
            .unwrap();
        let g = store
            .create_issue(&IssueBuilder::new("Grandchild").parent(c).build(), "alice")
            .unwrap();

        let err = store
            .update_issue(
                p,
                &IssueChanges {
                    parent_id: Some(Some(g)),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap_err();
        assert!(err.is_conflict(), "got {err:?}");

        // P unchanged.
        assert!(store.get_issue(p).unwrap().parent_id.is_none());
    }

    #[test]
    fn cascade_delete_removes_descendants() {
        let store = test_store();
        let p = create(&store, "Parent");
        let c1 = store
            .create_issue(&IssueBuilder::new("C1").parent(p).build(), "alice")
            .unwrap();
        let c2 = store
            .create_issue(&IssueBuilder::new("C2").parent(p).build(), "alice")
            .unwrap();

        let removed = store.cascade_delete_issue(p).unwrap();
        assert_eq!(removed, 3);
        assert!(store.get_issue(p).unwrap_err().is_not_found());
        assert!(store.get_issue(c1).unwrap_err().is_not_found());
        assert!(store.get_issue(c2).unwrap_err().is_not_found());
    }

    #[test]
    fn orphan_then_delete_keeps_children() {
        let store = test_store();
        let p = create(&store, "Parent");
        let c1 = store
            .create_issue(&IssueBuilder::new("C1").parent(p).build(), "alice")
            .unwrap();
        let c2 = store
            .create_issue(&IssueBuilder::new("C2").parent(p).build(), "alice")
            .unwrap();

        let orphaned = store.orphan_sub_issues(p, "x").unwrap();
        assert_eq!(orphaned, vec![c1, c2]);
        store.delete_issue(p).unwrap();

        for child in [c1, c2] {
            let issue = store.get_issue(child).unwrap();
            assert!(issue.parent_id.is_none());
            let parent_changes: Vec<_> = store
                .list_activity(child)
                .unwrap()
                .into_iter()
                .filter(|a| a.field_changed == "parent_id")
                .collect();
            assert_eq!(parent_changes.len(), 1);
            assert_eq!(
                parent_changes[0].old_value.as_deref(),
                Some(p.raw().to_string().as_str())
            );
            assert!(parent_changes[0].new_value.is_none());
        }
    }

    #[test]
    fn sub_issue_progress() {
        let store = test_store();
        let p = create(&store, "Epic");
        let c1 = store
            .create_issue(&IssueBuilder::new("C1").parent(p).build(), "alice")
            .unwrap();
        store
            .create_issue(&IssueBuilder::new("C2").parent(p).build(), "alice")
            .unwrap();
        store
            .update_issue(
                c1,
                &IssueChanges {
                    status: Some(Status::Done),
                    ..Default::default()
                },
                "alice",
            )
            .unwrap();

        assert_eq!(store.get_sub_issue_progress(p).unwrap(), (1, 2));

        let batch = store.get_batch_sub_issue_progress(&[p, c1]).unwrap();
        assert_eq!(batch[&p.raw()], (1, 2));
        assert_eq!(batch[&c1.raw()], (0, 0));
    }

    #[test]
    fn sub_issue_tree_is_recursive() {
        let store = test_store();
        let p = create(&store, "Root");
        let c = store
            .create_issue(&IssueBuilder::new("Child").parent(p).build(), "alice")
            .unwrap();
        let g = store
            .create_issue(&IssueBuilder::new("Grandchild").parent(c).build(), "alice")
            .unwrap();

        let direct = store.get_sub_issues(p).unwrap();
        assert_eq!(direct.len(), 1);

        let tree = store.get_sub_issue_tree(p).unwrap();
        let ids: Vec<IssueId> = tree.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c, g]);

        assert!(store.is_descendant(p, g).unwrap());
        assert!(!store.is_descendant(g, p).unwrap());
    }

    #[test]
    fn get_issues_by_ids_hydrates_labels() {
        let store = test_store();
        let a = store
            .create_issue(
                &IssueBuilder::new("A").labels(vec!["x".into()]).build(),
                "alice",
            )
            .unwrap();
        let b = create(&store, "B");

        let map = store
            .get_issues_by_ids(&[a, b, "DKT-99".parse().unwrap()])
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&a.raw()].labels, vec!["x"]);
    }
}
