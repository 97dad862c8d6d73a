//! Binary resolution.
//!
//! GUI-launched processes inherit a restricted launchd PATH that misses the
//! Homebrew prefixes most CLIs install into, so a plain `which` lookup
//! fails there even though the tool is present. Resolution therefore falls
//! back to probing a fixed list of common install directories.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Install directories probed when PATH resolution fails.
///
/// Homebrew on Apple Silicon, Homebrew/manual installs on Intel, MacPorts,
/// and the stock system directory.
const FALLBACK_DIRS: &[&str] = &[
    "/opt/homebrew/bin",
    "/usr/local/bin",
    "/opt/local/bin",
    "/usr/bin",
];

/// Resolves a binary to an absolute path.
///
/// Order: PATH via `which`, then the fixed fallback directories, then the
/// user-local directories (`~/.local/bin`, `~/.cargo/bin`, `~/bin`).
/// Absence is a normal outcome, not an error.
pub fn locate(name: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        trace!(binary = name, path = %path.display(), "Resolved via PATH");
        return Some(path);
    }

    for dir in FALLBACK_DIRS {
        let candidate = Path::new(dir).join(name);
        if is_executable(&candidate) {
            debug!(binary = name, path = %candidate.display(), "Resolved via fallback directory");
            return Some(candidate);
        }
    }

    for dir in user_dirs() {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            debug!(binary = name, path = %candidate.display(), "Resolved via user directory");
            return Some(candidate);
        }
    }

    debug!(binary = name, "Binary not found");
    None
}

/// Resolves a binary, honoring an override environment variable first.
///
/// When `env_var` is set and names an executable file, that path wins
/// unconditionally; otherwise resolution proceeds as [`locate`].
pub fn locate_with_override(name: &str, env_var: Option<&str>) -> Option<PathBuf> {
    if let Some(var) = env_var {
        if let Ok(value) = std::env::var(var) {
            let candidate = PathBuf::from(value);
            if is_executable(&candidate) {
                debug!(binary = name, env = var, path = %candidate.display(), "Resolved via override");
                return Some(candidate);
            }
        }
    }
    locate(name)
}

/// Returns true if the binary can be resolved.
pub fn exists(name: &str) -> bool {
    locate(name).is_some()
}

fn user_dirs() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![
        home.join(".local/bin"),
        home.join(".cargo/bin"),
        home.join("bin"),
    ]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_common_binary() {
        // sh exists on every supported platform's PATH or /usr/bin
        assert!(locate("sh").is_some());
        assert!(exists("sh"));
    }

    #[test]
    fn missing_binary_is_none_not_error() {
        assert!(locate("definitely_not_a_real_command_xyz123").is_none());
        assert!(!exists("definitely_not_a_real_command_xyz123"));
    }

    #[test]
    fn override_env_wins() {
        let sh = locate("sh").unwrap();
        // Use a process-unique variable name to avoid cross-test races.
        let var = "QUOTABAR_TEST_LOCATE_OVERRIDE";
        unsafe { std::env::set_var(var, &sh) };
        let resolved = locate_with_override("something_else_entirely", Some(var));
        assert_eq!(resolved, Some(sh));
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn bad_override_falls_back() {
        let var = "QUOTABAR_TEST_LOCATE_BAD_OVERRIDE";
        unsafe { std::env::set_var(var, "/nonexistent/path/to/tool") };
        assert!(locate_with_override("sh", Some(var)).is_some());
        unsafe { std::env::remove_var(var) };
    }
}
