//! DDL statements and migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in RFC 3339 second precision so that
//! string comparison matches time order. The schema version lives in the
//! `meta` key-value table; migrations are an ordered list keyed by target
//! version and each step runs in its own transaction.

/// A single migration step. Applying it brings the schema to `version`.
pub struct Migration {
    /// Target schema version after this step.
    pub version: i64,
    /// Short human-readable name, used in error messages.
    pub name: &'static str,
    /// DDL batch executed inside the step's transaction.
    pub sql: &'static str,
}

/// Current schema version: the target version of the last migration.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// All migrations, ordered by target version.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial schema",
    sql: INITIAL_SCHEMA,
}];

/// Version 1: the full base schema.
const INITIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS issues (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id   INTEGER REFERENCES issues(id) ON DELETE SET NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status      TEXT NOT NULL DEFAULT 'backlog',
    priority    TEXT NOT NULL DEFAULT 'none',
    kind        TEXT NOT NULL DEFAULT 'task',
    assignee    TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority);
CREATE INDEX IF NOT EXISTS idx_issues_assignee ON issues(assignee);
CREATE INDEX IF NOT EXISTS idx_issues_parent ON issues(parent_id);
CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at);
CREATE INDEX IF NOT EXISTS idx_issues_updated_at ON issues(updated_at);

CREATE TABLE IF NOT EXISTS comments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id   INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    body       TEXT NOT NULL,
    author     TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);

CREATE TABLE IF NOT EXISTS labels (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE,
    color TEXT
);

CREATE TABLE IF NOT EXISTS issue_labels (
    issue_id INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
    PRIMARY KEY (issue_id, label_id)
);

CREATE INDEX IF NOT EXISTS idx_issue_labels_label ON issue_labels(label_id);

CREATE TABLE IF NOT EXISTS issue_relations (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    source_issue_id INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    target_issue_id INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    relation_type   TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    UNIQUE (source_issue_id, target_issue_id, relation_type)
);

CREATE INDEX IF NOT EXISTS idx_relations_source ON issue_relations(source_issue_id);
CREATE INDEX IF NOT EXISTS idx_relations_target ON issue_relations(target_issue_id);

-- An inverse duplicate of the same type is silently dropped so that the
-- import path's insert-or-ignore counts it as skipped. create_relation
-- reports the conflict from its explicit pre-check before reaching here.
CREATE TRIGGER IF NOT EXISTS trg_relations_inverse_duplicate
BEFORE INSERT ON issue_relations
FOR EACH ROW
WHEN EXISTS (
    SELECT 1 FROM issue_relations
    WHERE source_issue_id = NEW.target_issue_id
      AND target_issue_id = NEW.source_issue_id
      AND relation_type = NEW.relation_type
)
BEGIN
    SELECT RAISE(IGNORE);
END;

CREATE TABLE IF NOT EXISTS activity_log (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id      INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    field_changed TEXT NOT NULL,
    old_value     TEXT,
    new_value     TEXT,
    changed_by    TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_issue ON activity_log(issue_id);

CREATE TABLE IF NOT EXISTS issue_files (
    issue_id  INTEGER NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
    file_path TEXT NOT NULL,
    PRIMARY KEY (issue_id, file_path)
);
"#;
