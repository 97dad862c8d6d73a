//! Injected probe configuration.
//!
//! Probes never read global state directly; the caller builds a
//! [`ProbeSettings`] and hands it in. The excluded persistence layer is the
//! usual source of these values.

use std::path::PathBuf;
use std::time::Duration;

/// Default per-probe deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle window after which an interactive CLI is considered settled.
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(4);

/// Read-only configuration injected into probes.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Hard deadline for one probe attempt.
    pub timeout: Duration,
    /// Idle window with no output before a PTY capture is considered done.
    pub idle_timeout: Option<Duration>,
    /// Environment variable consulted for a binary-path override
    /// (e.g. `QUOTABAR_CLAUDE_BIN`).
    pub binary_override_env: Option<String>,
    /// Override for a provider's credential file location.
    pub credential_path: Option<PathBuf>,
    /// Working directory for spawned CLIs.
    pub working_dir: Option<PathBuf>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            binary_override_env: None,
            credential_path: None,
            working_dir: None,
        }
    }
}

impl ProbeSettings {
    /// Settings with a custom deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Sets the binary-override environment variable name.
    pub fn binary_override(mut self, env_var: impl Into<String>) -> Self {
        self.binary_override_env = Some(env_var.into());
        self
    }

    /// Sets the credential file override.
    pub fn credential_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_path = Some(path.into());
        self
    }

    /// Sets the working directory for spawned CLIs.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.idle_timeout.is_some());
        assert!(settings.binary_override_env.is_none());
    }

    #[test]
    fn builder_chains() {
        let settings = ProbeSettings::with_timeout(Duration::from_secs(5))
            .binary_override("QUOTABAR_CLAUDE_BIN")
            .working_dir("/tmp");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(
            settings.binary_override_env.as_deref(),
            Some("QUOTABAR_CLAUDE_BIN")
        );
    }
}
