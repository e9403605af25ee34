//! Runtime context for command execution.
//!
//! Constructed once in `main` after CLI parsing. Holds the resolved
//! docket directory, the author for activity attribution, and the global
//! output flags. The [`Store`] is opened on demand by commands that need
//! the database.

use std::path::PathBuf;

use anyhow::Result;

use docket_config::{db_path, default_author, resolve_docket_dir};
use docket_storage::{Store, StoreError};

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Resolved docket directory (may not exist yet before `init`).
    pub docket_dir: PathBuf,

    /// Author recorded on activity rows.
    pub author: String,

    /// Structured (JSON envelope) output.
    pub json: bool,

    /// Suppress informational stderr output.
    pub quiet: bool,

    /// Verbose logging.
    pub verbose: bool,
}

impl RuntimeContext {
    /// Builds the context from parsed global arguments.
    ///
    /// The author chain is: `--author` flag, then version-control user,
    /// then OS user, then `"unknown"` (the latter three via
    /// [`default_author`], cached process-wide).
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let author = match global.author.as_deref() {
            Some(author) if !author.trim().is_empty() => author.trim().to_string(),
            _ => default_author().to_string(),
        };

        Ok(Self {
            docket_dir: resolve_docket_dir()?,
            author,
            json: global.json,
            quiet: global.quiet,
            verbose: global.verbose,
        })
    }

    /// The database file path inside the docket directory.
    pub fn db_path(&self) -> PathBuf {
        db_path(&self.docket_dir)
    }

    /// Opens the store, failing with `NotFound` when the database does not
    /// exist yet.
    pub fn open_store(&self) -> Result<Store> {
        let path = self.db_path();
        if !path.is_file() {
            return Err(StoreError::not_found("database", path.display()).into());
        }
        Ok(Store::open(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GlobalArgs;

    fn global(author: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            json: false,
            quiet: false,
            verbose: false,
            author: author.map(str::to_string),
        }
    }

    #[test]
    fn author_flag_wins() {
        let ctx = RuntimeContext::from_global_args(&global(Some("alice"))).unwrap();
        assert_eq!(ctx.author, "alice");
    }

    #[test]
    fn empty_author_falls_through() {
        let ctx = RuntimeContext::from_global_args(&global(Some("  "))).unwrap();
        assert!(!ctx.author.is_empty());
    }

    #[test]
    fn open_store_without_db_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = RuntimeContext {
            docket_dir: tmp.path().join(".docket"),
            author: "alice".into(),
            json: false,
            quiet: false,
            verbose: false,
        };
        let err = ctx.open_store().unwrap_err();
        assert_eq!(
            crate::output::error_code_for(&err),
            crate::output::ErrorCode::NotFound
        );
    }
}
