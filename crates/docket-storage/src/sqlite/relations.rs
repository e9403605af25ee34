//! Relation operations and insert-time cycle detection for [`Store`].
//!
//! Relations are unique over the unordered endpoint pair per type; the
//! directional types (`blocks`, `depends_on`) must additionally stay
//! acyclic, each within its own graph.

use std::collections::{HashMap, HashSet, VecDeque};

use rusqlite::{Connection, Row, params};

use docket_core::entity::Relation;
use docket_core::enums::RelationType;
use docket_core::id::IssueId;
use docket_core::time;

use crate::error::{Result, StoreError};
use crate::sqlite::activity::{ensure_issue_exists, record_activity};
use crate::sqlite::store::Store;

/// Deserialises a row from `issue_relations`.
pub(crate) fn scan_relation(row: &Row<'_>) -> rusqlite::Result<Relation> {
    let raw_source: i64 = row.get("source_issue_id")?;
    let raw_target: i64 = row.get("target_issue_id")?;
    let type_str: String = row.get("relation_type")?;
    let created_at_str: String = row.get("created_at")?;
    Ok(Relation {
        id: row.get("id")?,
        source_id: IssueId::new(raw_source).expect("stored issue ids are positive"),
        target_id: IssueId::new(raw_target).expect("stored issue ids are positive"),
        relation_type: type_str.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        created_at: time::parse_ts(&created_at_str),
    })
}

// ---------------------------------------------------------------------------
// Cycle detection
// ---------------------------------------------------------------------------

/// Checks whether inserting `source -> target` of `rtype` would close a
/// cycle, by testing reachability of `source` from `target` over existing
/// same-type edges.
///
/// On failure the error carries the full cycle path, starting and ending
/// at `source`.
fn detect_cycle(
    conn: &Connection,
    source: IssueId,
    target: IssueId,
    rtype: RelationType,
) -> Result<()> {
    let mut visited: HashSet<i64> = HashSet::new();
    let mut parents: HashMap<i64, i64> = HashMap::new();
    let mut queue: VecDeque<i64> = VecDeque::new();
    queue.push_back(target.raw());

    while let Some(current) = queue.pop_front() {
        if current == source.raw() {
            // Walk back to the would-be target, then close the loop at the
            // source: inserting 3 -> 1 over 1 -> 2 -> 3 reports [3, 1, 2, 3].
            let mut chain = vec![current];
            let mut node = current;
            while node != target.raw() {
                node = parents[&node];
                chain.push(node);
            }
            chain.reverse();
            let mut path = vec![source.raw()];
            path.extend(chain);
            return Err(StoreError::CycleDetected { path });
        }
        if !visited.insert(current) {
            continue;
        }

        let mut stmt = conn.prepare_cached(
            "SELECT target_issue_id FROM issue_relations
             WHERE source_issue_id = ?1 AND relation_type = ?2",
        )?;
        let rows = stmt.query_map(params![current, rtype.as_str()], |row| {
            row.get::<_, i64>(0)
        })?;
        for row in rows {
            let next = row?;
            if !visited.contains(&next) {
                parents.entry(next).or_insert(current);
                queue.push_back(next);
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Store methods
// ---------------------------------------------------------------------------

impl Store {
    /// Creates a relation after the full validation ladder: no
    /// self-relations, both endpoints exist, no duplicate in either
    /// direction, no cycle for directional types.
    ///
    /// Records a `relation_added` activity row on both endpoints. The
    /// issues' `updated_at` is deliberately left alone.
    pub fn create_relation(
        &self,
        source: IssueId,
        target: IssueId,
        rtype: RelationType,
        author: &str,
    ) -> Result<Relation> {
        if source == target {
            return Err(StoreError::validation(format!(
                "{source} cannot relate to itself"
            )));
        }

        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        ensure_issue_exists(&tx, source)?;
        ensure_issue_exists(&tx, target)?;

        let duplicates: i64 = tx.query_row(
            "SELECT COUNT(*) FROM issue_relations
             WHERE relation_type = ?1
               AND ((source_issue_id = ?2 AND target_issue_id = ?3)
                 OR (source_issue_id = ?3 AND target_issue_id = ?2))",
            params![rtype.as_str(), source.raw(), target.raw()],
            |row| row.get(0),
        )?;
        if duplicates > 0 {
            return Err(StoreError::DuplicateRelation {
                relation_type: rtype.as_str().to_string(),
                source_id: source.to_string(),
                target: target.to_string(),
            });
        }

        if rtype.is_directional() {
            detect_cycle(&tx, source, target, rtype)?;
        }

        let now = time::now();
        let now_str = time::format_ts(&now);
        tx.execute(
            "INSERT OR IGNORE INTO issue_relations
             (source_issue_id, target_issue_id, relation_type, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![source.raw(), target.raw(), rtype.as_str(), now_str],
        )?;
        if tx.changes() == 0 {
            // The inverse-duplicate trigger dropped the row.
            return Err(StoreError::DuplicateRelation {
                relation_type: rtype.as_str().to_string(),
                source_id: source.to_string(),
                target: target.to_string(),
            });
        }
        let id = tx.last_insert_rowid();

        let on_source = format!("{} {target}", rtype.as_str());
        let on_target = format!("{} {source}", rtype.inverse_label());
        record_activity(
            &tx,
            source.raw(),
            "relation_added",
            None,
            Some(on_source.as_str()),
            author,
            &now_str,
        )?;
        record_activity(
            &tx,
            target.raw(),
            "relation_added",
            None,
            Some(on_target.as_str()),
            author,
            &now_str,
        )?;

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;

        Ok(Relation {
            id,
            source_id: source,
            target_id: target,
            relation_type: rtype,
            created_at: now,
        })
    }

    /// Deletes a relation, matching either direction of the endpoint pair,
    /// and records the reversed activity pair (`relation_removed`).
    pub fn delete_relation(
        &self,
        source: IssueId,
        target: IssueId,
        rtype: RelationType,
        author: &str,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

        // Resolve the stored direction first so the activity text matches it.
        let stored: Option<(i64, i64)> = tx
            .query_row(
                "SELECT source_issue_id, target_issue_id FROM issue_relations
                 WHERE relation_type = ?1
                   AND ((source_issue_id = ?2 AND target_issue_id = ?3)
                     OR (source_issue_id = ?3 AND target_issue_id = ?2))",
                params![rtype.as_str(), source.raw(), target.raw()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(StoreError::Query(other)),
            })?;

        let Some((stored_source, stored_target)) = stored else {
            return Err(StoreError::not_found(
                "relation",
                format!("{source} {rtype} {target}"),
            ));
        };

        tx.execute(
            "DELETE FROM issue_relations
             WHERE relation_type = ?1 AND source_issue_id = ?2 AND target_issue_id = ?3",
            params![rtype.as_str(), stored_source, stored_target],
        )?;

        let src_id = IssueId::new(stored_source).expect("stored issue ids are positive");
        let tgt_id = IssueId::new(stored_target).expect("stored issue ids are positive");
        let now_str = time::format_ts(&time::now());
        let on_source = format!("{} {tgt_id}", rtype.as_str());
        let on_target = format!("{} {src_id}", rtype.inverse_label());
        record_activity(
            &tx,
            stored_source,
            "relation_removed",
            Some(on_source.as_str()),
            None,
            author,
            &now_str,
        )?;
        record_activity(
            &tx,
            stored_target,
            "relation_removed",
            Some(on_target.as_str()),
            None,
            author,
            &now_str,
        )?;

        tx.commit()
            .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// Returns every relation touching the given issue, from either side.
    pub fn get_issue_relations(&self, issue_id: IssueId) -> Result<Vec<Relation>> {
        let conn = self.lock_conn()?;
        ensure_issue_exists(&conn, issue_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, source_issue_id, target_issue_id, relation_type, created_at
             FROM issue_relations
             WHERE source_issue_id = ?1 OR target_issue_id = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![issue_id.raw()], scan_relation)?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    /// Returns all `blocks` and `depends_on` relations (the planner's input).
    pub fn get_all_directional_relations(&self) -> Result<Vec<Relation>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_issue_id, target_issue_id, relation_type, created_at
             FROM issue_relations
             WHERE relation_type IN ('blocks', 'depends_on')
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], scan_relation)?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    /// Returns every relation in the database.
    pub fn get_all_relations(&self) -> Result<Vec<Relation>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_issue_id, target_issue_id, relation_type, created_at
             FROM issue_relations ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], scan_relation)?;
        let mut relations = Vec::new();
        for row in rows {
            relations.push(row?);
        }
        Ok(relations)
    }

    /// Inserts a relation with its original id (import path).
    ///
    /// Insert-or-ignore semantics; the inverse-duplicate trigger also
    /// resolves to "not inserted". Cycle detection is not re-run.
    pub fn insert_relation_with_id(&self, relation: &Relation) -> Result<bool> {
        let conn = self.lock_conn()?;
        crate::sqlite::import::insert_relation_on_conn(&conn, relation)
    }
}
