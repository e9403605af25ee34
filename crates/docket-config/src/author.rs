//! Default author resolution.
//!
//! Priority chain: `git config user.name` (short-lived subprocess, 2 s
//! timeout, failure non-fatal) > `$USER` / `$USERNAME` > `"unknown"`.
//! The result is cached process-wide on first use.

use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use tracing::debug;

/// How long the version-control lookup may take before it is abandoned.
const GIT_TIMEOUT: Duration = Duration::from_secs(2);

static DEFAULT_AUTHOR: OnceLock<String> = OnceLock::new();

/// Returns the default author for activity attribution.
///
/// Computed once per process; subsequent calls return the cached value.
pub fn default_author() -> &'static str {
    DEFAULT_AUTHOR.get_or_init(resolve_author)
}

fn resolve_author() -> String {
    if let Some(name) = git_user_name() {
        return name;
    }

    if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
        if !user.is_empty() {
            return user;
        }
    }

    "unknown".to_string()
}

/// Reads `git config user.name`, bounded by [`GIT_TIMEOUT`].
///
/// Any failure (git missing, non-zero exit, timeout, empty output) is
/// treated as "no answer".
fn git_user_name() -> Option<String> {
    let mut child = Command::new("git")
        .args(["config", "user.name"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + GIT_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                break;
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    debug!("git config user.name timed out, falling back");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    }

    let mut output = String::new();
    use std::io::Read;
    child.stdout.take()?.read_to_string(&mut output).ok()?;
    let name = output.trim();
    (!name.is_empty()).then(|| name.to_string())
}
