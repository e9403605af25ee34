//! List queries, counts, and bulk operations for [`Store`].

use docket_core::enums::{Priority, Status};
use docket_core::filter::{ListFilter, Sort};
use docket_core::issue::Issue;

use crate::error::{Result, StoreError};
use crate::sqlite::issues::{ISSUE_COLUMNS, scan_issue};
use crate::sqlite::labels::hydrate_labels;
use crate::sqlite::store::Store;

/// Builds the `CASE status ... END` expression ranking workflow order.
fn status_rank_sql() -> String {
    let whens: Vec<String> = Status::ALL
        .iter()
        .map(|s| format!("WHEN '{}' THEN {}", s.as_str(), s.workflow_rank()))
        .collect();
    format!("CASE status {} END", whens.join(" "))
}

/// Builds the `CASE priority ... END` expression ranking priority order.
fn priority_rank_sql() -> String {
    let whens: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("WHEN '{}' THEN {}", p.as_str(), p.rank()))
        .collect();
    format!("CASE priority {} END", whens.join(" "))
}

/// Maps a validated sort field to its column. The field has already passed
/// the allowlist and identifier checks in [`Sort`].
fn sort_column(field: &str) -> &str {
    match field {
        "type" => "kind",
        other => other,
    }
}

impl Store {
    /// Lists issues matching the filter, labels hydrated, together with the
    /// total match count.
    ///
    /// Repeated values within a field are OR-combined; labels are
    /// AND-combined. `done` issues are excluded unless the filter asks for
    /// them. Without an explicit sort, the compound rank applies: workflow
    /// status order, then priority, then newest first.
    pub fn list_issues(&self, filter: &ListFilter) -> Result<(Vec<Issue>, i64)> {
        let conn = self.lock_conn()?;

        let mut where_clauses: Vec<String> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        let mut param_idx = 1;

        if !filter.statuses.is_empty() {
            let placeholders: Vec<String> = filter
                .statuses
                .iter()
                .enumerate()
                .map(|(j, _)| format!("?{}", param_idx + j))
                .collect();
            where_clauses.push(format!("status IN ({})", placeholders.join(",")));
            for status in &filter.statuses {
                param_values.push(Box::new(status.as_str()));
            }
            param_idx += filter.statuses.len();
        } else if !filter.wants_done() {
            where_clauses.push("status != 'done'".to_string());
        }

        if !filter.priorities.is_empty() {
            let placeholders: Vec<String> = filter
                .priorities
                .iter()
                .enumerate()
                .map(|(j, _)| format!("?{}", param_idx + j))
                .collect();
            where_clauses.push(format!("priority IN ({})", placeholders.join(",")));
            for priority in &filter.priorities {
                param_values.push(Box::new(priority.as_str()));
            }
            param_idx += filter.priorities.len();
        }

        if !filter.kinds.is_empty() {
            let placeholders: Vec<String> = filter
                .kinds
                .iter()
                .enumerate()
                .map(|(j, _)| format!("?{}", param_idx + j))
                .collect();
            where_clauses.push(format!("kind IN ({})", placeholders.join(",")));
            for kind in &filter.kinds {
                param_values.push(Box::new(kind.as_str()));
            }
            param_idx += filter.kinds.len();
        }

        if let Some(ref assignee) = filter.assignee {
            where_clauses.push(format!("assignee = ?{param_idx}"));
            param_values.push(Box::new(assignee.clone()));
            param_idx += 1;
        }

        if let Some(parent) = filter.parent {
            where_clauses.push(format!("parent_id = ?{param_idx}"));
            param_values.push(Box::new(parent.raw()));
            param_idx += 1;
        }
        if filter.roots {
            where_clauses.push("parent_id IS NULL".to_string());
        }

        // Label filters (AND): one EXISTS per required label.
        for label in &filter.labels {
            where_clauses.push(format!(
                "EXISTS (SELECT 1 FROM issue_labels il
                         JOIN labels l ON l.id = il.label_id
                         WHERE il.issue_id = issues.id AND l.name = ?{param_idx})"
            ));
            param_values.push(Box::new(label.clone()));
            param_idx += 1;
        }
        let _ = param_idx;

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let order_sql = match &filter.sort {
            Some(Sort { field, descending }) => {
                let dir = if *descending { "DESC" } else { "ASC" };
                format!("{} {dir}", sort_column(field))
            }
            None => format!(
                "{} ASC, {} ASC, created_at DESC",
                status_rank_sql(),
                priority_rank_sql()
            ),
        };

        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM issues{where_sql}"),
            param_refs.as_slice(),
            |row| row.get(0),
        )?;

        let sql =
            format!("SELECT {ISSUE_COLUMNS} FROM issues{where_sql} ORDER BY {order_sql}, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        hydrate_labels(&conn, &mut issues)?;

        Ok((issues, total))
    }

    /// Returns every issue, ordered by id (export path, no hydration).
    pub fn list_all_issues(&self) -> Result<Vec<Issue>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues ORDER BY id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], scan_issue)?;
        let mut issues = Vec::new();
        for row in rows {
            issues.push(row?);
        }
        Ok(issues)
    }

    /// Total number of issues.
    pub fn count_issues(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?)
    }

    /// Number of issues without a parent.
    pub fn count_root_issues(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM issues WHERE parent_id IS NULL",
            [],
            |row| row.get(0),
        )?)
    }

    /// Issue counts per status, in workflow order. Statuses with no issues
    /// are included with a zero count.
    pub fn count_by_status(&self) -> Result<Vec<(Status, i64)>> {
        let conn = self.lock_conn()?;
        let mut counts: Vec<(Status, i64)> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM issues GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (status_str, count) = row?;
            if let Ok(status) = status_str.parse::<Status>() {
                if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                    entry.1 = count;
                }
            }
        }
        Ok(counts)
    }

    /// Issue counts per priority, critical first.
    pub fn count_by_priority(&self) -> Result<Vec<(Priority, i64)>> {
        let conn = self.lock_conn()?;
        let mut counts: Vec<(Priority, i64)> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
        let mut stmt = conn.prepare("SELECT priority, COUNT(*) FROM issues GROUP BY priority")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (priority_str, count) = row?;
            if let Ok(priority) = priority_str.parse::<Priority>() {
                if let Some(entry) = counts.iter_mut().find(|(p, _)| *p == priority) {
                    entry.1 = count;
                }
            }
        }
        Ok(counts)
    }

    /// Deletes every row in dependency order, preserving schema and meta.
    pub fn clear_all_data(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;
        crate::sqlite::import::clear_all_data_on_conn(&tx)?;
        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }
}
