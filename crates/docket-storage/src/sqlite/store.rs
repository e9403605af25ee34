//! [`Store`] -- SQLite-backed storage for docket.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::sqlite::schema;

/// SQLite-backed store owning the single database connection.
///
/// The engine is single-writer; wrapping the connection in a `Mutex` makes
/// that contract explicit and serializes all public operations.
pub struct Store {
    /// The mutex-protected SQLite connection.
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) the database at the given path.
    ///
    /// Enables WAL mode and foreign keys, then applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening docket database");

        let conn = Connection::open(path).map_err(|e| {
            StoreError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.migrate()?;

        Ok(store)
    }

    /// Opens an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory docket database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Connection(format!("failed to open in-memory db: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.migrate()?;

        Ok(store)
    }

    /// Sets connection pragmas (WAL mode, foreign keys, busy timeout).
    fn configure_connection(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StoreError::Connection(format!("failed to set pragmas: {e}")))?;
        Ok(())
    }

    /// Applies pending migrations, bumping `meta.schema_version` once per
    /// step. Each step runs in its own transaction.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        // The meta table itself is created outside the versioned list so a
        // fresh database has somewhere to record version 0 -> 1.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .map_err(|e| StoreError::Migration {
            version: 0,
            reason: format!("failed to create meta table: {e}"),
        })?;

        let mut version = schema_version_on_conn(&conn)?;

        for migration in schema::MIGRATIONS {
            if migration.version <= version {
                debug!(
                    version = migration.version,
                    "migration already applied, skipping"
                );
                continue;
            }

            debug!(version = migration.version, name = migration.name, "applying migration");
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| StoreError::Transaction(format!("failed to begin: {e}")))?;

            tx.execute_batch(migration.sql)
                .map_err(|e| StoreError::Migration {
                    version: migration.version,
                    reason: format!("{} ({e})", migration.name),
                })?;

            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
                rusqlite::params![migration.version.to_string()],
            )
            .map_err(|e| StoreError::Migration {
                version: migration.version,
                reason: format!("failed to record version: {e}"),
            })?;

            tx.commit()
                .map_err(|e| StoreError::Transaction(format!("failed to commit: {e}")))?;

            version = migration.version;
        }

        info!(version, "schema up to date");
        Ok(())
    }

    /// Returns the persisted schema version.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        schema_version_on_conn(&conn)
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

/// Reads `meta.schema_version`, returning 0 when unset.
pub(crate) fn schema_version_on_conn(conn: &Connection) -> Result<i64> {
    let version = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| {
                let v: String = row.get(0)?;
                Ok(v.parse::<i64>().unwrap_or(0))
            },
        )
        .unwrap_or(0);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_applies_schema() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.lock_conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'issues'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn schema_version_is_current() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(
            store.schema_version().unwrap(),
            schema::CURRENT_SCHEMA_VERSION
        );
    }

    #[test]
    fn migrate_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        store.migrate().unwrap();
        assert_eq!(
            store.schema_version().unwrap(),
            schema::CURRENT_SCHEMA_VERSION
        );
    }

    #[test]
    fn open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.db");
        {
            let _store = Store::open(&path).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(
            store.schema_version().unwrap(),
            schema::CURRENT_SCHEMA_VERSION
        );
    }
}
