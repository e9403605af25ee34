//! Directory and author resolution for the docket issue tracker.
//!
//! Two small concerns with no dependencies on the rest of the system:
//! where the docket directory and database live, and who to record as the
//! author of a change when the caller does not say.

pub mod author;
pub mod docket_dir;

pub use author::default_author;
pub use docket_dir::{
    ConfigError, DB_FILE_NAME, DOCKET_DIR_NAME, DOCKET_PATH_ENV, db_path, ensure_docket_dir,
    resolve_docket_dir,
};
