//! SQLite storage backend for the docket issue tracker.
//!
//! The [`Store`] owns a single connection to the embedded database and
//! enforces the domain invariants through transaction discipline: every
//! mutating operation runs in one transaction that also writes the
//! activity rows describing it.

pub mod error;
pub mod sqlite;
pub mod transfer;

pub use error::{Result, StoreError};
pub use sqlite::issues::IssueChanges;
pub use sqlite::store::Store;
pub use transfer::{ExportDocument, ImportCounts, ImportMode};
