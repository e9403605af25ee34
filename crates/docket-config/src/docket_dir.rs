//! Resolution and creation of the docket directory.
//!
//! The rule is deliberately small: a non-empty `DOCKET_PATH` environment
//! variable wins, otherwise the directory is `<cwd>/.docket`. No tree
//! walking. The database file inside it is always `issues.db`.

use std::path::{Path, PathBuf};

/// The name of the docket metadata directory.
pub const DOCKET_DIR_NAME: &str = ".docket";

/// Environment variable overriding the docket directory.
pub const DOCKET_PATH_ENV: &str = "DOCKET_PATH";

/// The database file name inside the docket directory.
pub const DB_FILE_NAME: &str = "issues.db";

/// Errors from directory resolution and creation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The current working directory could not be determined.
    #[error("failed to determine current directory: {0}")]
    CurrentDir(std::io::Error),

    /// Creating the docket directory failed.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
}

/// Resolves the docket directory: `DOCKET_PATH` if set and non-empty,
/// otherwise `<cwd>/.docket`. The directory is not required to exist.
pub fn resolve_docket_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(DOCKET_PATH_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    Ok(cwd.join(DOCKET_DIR_NAME))
}

/// Returns the database path inside a docket directory.
pub fn db_path(docket_dir: &Path) -> PathBuf {
    docket_dir.join(DB_FILE_NAME)
}

/// Creates the docket directory (and parents) if missing, with mode 0755
/// on unix. Returns whether it had to be created.
pub fn ensure_docket_dir(docket_dir: &Path) -> Result<bool, ConfigError> {
    if docket_dir.is_dir() {
        return Ok(false);
    }

    std::fs::create_dir_all(docket_dir).map_err(|source| ConfigError::CreateDir {
        path: docket_dir.display().to_string(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o755);
        std::fs::set_permissions(docket_dir, perms).map_err(|source| ConfigError::CreateDir {
            path: docket_dir.display().to_string(),
            source,
        })?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_appends_file_name() {
        assert_eq!(
            db_path(Path::new("/tmp/.docket")),
            PathBuf::from("/tmp/.docket/issues.db")
        );
    }

    #[test]
    fn ensure_creates_and_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(DOCKET_DIR_NAME);

        assert!(ensure_docket_dir(&dir).unwrap());
        assert!(dir.is_dir());
        // Second call is a no-op.
        assert!(!ensure_docket_dir(&dir).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_sets_mode_0755() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(DOCKET_DIR_NAME);
        ensure_docket_dir(&dir).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    // resolve_docket_dir reads process-global environment; exercised
    // end-to-end by the CLI integration tests to avoid env races between
    // parallel unit tests.
}
