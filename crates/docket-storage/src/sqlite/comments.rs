//! Comment operations for [`Store`].

use rusqlite::{Row, params};

use docket_core::entity::Comment;
use docket_core::id::IssueId;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::activity::{ensure_issue_exists, record_activity};
use crate::sqlite::store::Store;

/// Deserialises a row from `comments`.
pub(crate) fn scan_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    let raw_issue: i64 = row.get("issue_id")?;
    let created_at_str: String = row.get("created_at")?;
    Ok(Comment {
        id: row.get("id")?,
        issue_id: IssueId::new(raw_issue).expect("stored issue ids are positive"),
        body: row.get("body")?,
        author: row.get("author")?,
        created_at: time::parse_ts(&created_at_str),
    })
}

impl Store {
    /// Adds a comment, refreshing the issue's `updated_at` and recording a
    /// `comment_added` activity row. Returns the created comment.
    pub fn create_comment(
        &self,
        issue_id: IssueId,
        body: &str,
        author: Option<&str>,
    ) -> Result<Comment> {
        if body.trim().is_empty() {
            return Err(StoreError::validation("comment body must not be empty"));
        }

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, issue_id)?;
        let now = time::now();
        let now_str = time::format_ts(&now);

        tx.execute(
            "INSERT INTO comments (issue_id, body, author, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![issue_id.raw(), body, author, now_str],
        )?;
        let id = tx.last_insert_rowid();

        // Recently-commented issues bubble up in sorted lists.
        tx.execute(
            "UPDATE issues SET updated_at = ?1 WHERE id = ?2",
            params![now_str, issue_id.raw()],
        )?;
        record_activity(
            &tx,
            issue_id.raw(),
            "comment_added",
            None,
            Some(body),
            author.unwrap_or("unknown"),
            &now_str,
        )?;

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;

        Ok(Comment {
            id,
            issue_id,
            body: body.to_string(),
            author: author.map(str::to_string),
            created_at: now,
        })
    }

    /// Retrieves a single comment by id.
    pub fn get_comment(&self, id: i64) -> Result<Comment> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT id, issue_id, body, author, created_at FROM comments WHERE id = ?1",
            params![id],
            scan_comment,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("comment", id),
            other => StoreError::Query(other),
        })
    }

    /// Returns the comments on an issue, oldest first.
    pub fn list_comments(&self, issue_id: IssueId) -> Result<Vec<Comment>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, issue_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, issue_id, body, author, created_at
             FROM comments WHERE issue_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![issue_id.raw()], scan_comment)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    /// Returns every comment in the database (export path).
    pub fn list_all_comments(&self) -> Result<Vec<Comment>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, issue_id, body, author, created_at FROM comments ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], scan_comment)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    /// Inserts a comment with its original id and timestamp (import path).
    ///
    /// Uses insert-or-ignore; returns whether the row was new. No activity
    /// is recorded and `updated_at` is left alone.
    pub fn insert_comment_with_id(&self, comment: &Comment) -> Result<bool> {
        let conn = self.lock_conn()?;
        crate::sqlite::import::insert_comment_on_conn(&conn, comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::issue::IssueBuilder;

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn add_and_list_comments() {
        let store = test_store();
        let id = store
            .create_issue(&IssueBuilder::new("Issue").build(), "alice")
            .unwrap();

        let comment = store
            .create_comment(id, "Looks good", Some("bob"))
            .unwrap();
        assert!(comment.id > 0);
        assert_eq!(comment.author.as_deref(), Some("bob"));

        let comments = store.list_comments(id).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "Looks good");

        let fetched = store.get_comment(comment.id).unwrap();
        assert_eq!(fetched.body, "Looks good");
    }

    #[test]
    fn comment_records_activity() {
        let store = test_store();
        let id = store
            .create_issue(&IssueBuilder::new("Issue").build(), "alice")
            .unwrap();
        store.create_comment(id, "note", None).unwrap();

        let activity = store.list_activity(id).unwrap();
        assert!(activity.iter().any(|a| a.field_changed == "comment_added"));
    }

    #[test]
    fn comment_on_missing_issue() {
        let store = test_store();
        let err = store
            .create_comment("DKT-9".parse().unwrap(), "hi", None)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_body_rejected() {
        let store = test_store();
        let id = store
            .create_issue(&IssueBuilder::new("Issue").build(), "alice")
            .unwrap();
        let err = store.create_comment(id, "   ", None).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }
}
