//! Activity log: the append-only audit trail.
//!
//! Every mutating path calls [`record_activity`] from inside the same
//! transaction as its mutation, so an activity row never appears without
//! its cause.

use rusqlite::{Connection, Row, params};

use docket_core::entity::Activity;
use docket_core::id::IssueId;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::store::Store;

/// Inserts one activity row.
pub(crate) fn record_activity(
    conn: &Connection,
    issue_id: i64,
    field_changed: &str,
    old_value: Option<&str>,
    new_value: Option<&str>,
    changed_by: &str,
    created_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity_log (issue_id, field_changed, old_value, new_value, changed_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![issue_id, field_changed, old_value, new_value, changed_by, created_at],
    )?;
    Ok(())
}

/// Deserialises a row from `activity_log`.
pub(crate) fn scan_activity(row: &Row<'_>) -> rusqlite::Result<Activity> {
    let raw_issue: i64 = row.get("issue_id")?;
    let created_at_str: String = row.get("created_at")?;
    Ok(Activity {
        id: row.get("id")?,
        issue_id: IssueId::new(raw_issue).expect("stored issue ids are positive"),
        field_changed: row.get("field_changed")?,
        old_value: row.get("old_value")?,
        new_value: row.get("new_value")?,
        changed_by: row.get("changed_by")?,
        created_at: time::parse_ts(&created_at_str),
    })
}

impl Store {
    /// Returns the activity trail for an issue, oldest first.
    pub fn list_activity(&self, issue_id: IssueId) -> Result<Vec<Activity>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, issue_id)?;

        let mut stmt = conn.prepare(
            "SELECT id, issue_id, field_changed, old_value, new_value, changed_by, created_at
             FROM activity_log WHERE issue_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![issue_id.raw()], scan_activity)?;
        let mut activity = Vec::new();
        for row in rows {
            activity.push(row?);
        }
        Ok(activity)
    }
}

/// Fails with `NotFound` when the issue row is absent.
pub(crate) fn ensure_issue_exists(conn: &Connection, issue_id: IssueId) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM issues WHERE id = ?1)",
        params![issue_id.raw()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found("issue", issue_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::issue::IssueBuilder;

    #[test]
    fn create_writes_created_activity() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .create_issue(&IssueBuilder::new("First").build(), "alice")
            .unwrap();

        let activity = store.list_activity(id).unwrap();
        assert!(!activity.is_empty());
        assert_eq!(activity[0].field_changed, "created");
        assert_eq!(activity[0].changed_by, "alice");
    }

    #[test]
    fn list_activity_missing_issue() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .list_activity("DKT-99".parse().unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
