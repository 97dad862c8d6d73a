//! Fetch-layer error types.
//!
//! These are internal to the execution layer. Probes convert them into the
//! closed [`ProbeError`] taxonomy before returning; the `From` impls below
//! define that classification.

use quotabar_core::ProbeError;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// PTY Error
// ============================================================================

/// Error type for PTY operations.
#[derive(Debug, Error)]
pub enum PtyError {
    /// Binary not found.
    #[error("command not found: {0}")]
    NotFound(String),

    /// Failed to open the pseudo-terminal pair.
    #[error("failed to create PTY: {0}")]
    CreateFailed(String),

    /// Failed to spawn the child on the PTY slave.
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    /// Overall deadline exceeded.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// IO error on the PTY master.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PtyError> for ProbeError {
    fn from(err: PtyError) -> Self {
        match err {
            PtyError::NotFound(binary) => ProbeError::CliNotFound(binary),
            PtyError::Timeout(after) => ProbeError::Timeout(after),
            other => ProbeError::ExecutionFailed(other.to_string()),
        }
    }
}

// ============================================================================
// Process Error
// ============================================================================

/// Error type for plain subprocess operations.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Binary not found.
    #[error("command not found: {0}")]
    NotFound(String),

    /// Command timed out.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// Non-zero exit code.
    #[error("command exited with code {code}: {stderr}")]
    NonZeroExit {
        /// Exit code from the process.
        code: i32,
        /// Standard error output.
        stderr: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessError> for ProbeError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound(binary) => ProbeError::CliNotFound(binary),
            ProcessError::Timeout(after) => ProbeError::Timeout(after),
            other => ProbeError::ExecutionFailed(other.to_string()),
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// Error type for HTTP probes.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Transport-level request failure.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Request deadline exceeded.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },
}

impl HttpError {
    /// Classifies this error into the probe taxonomy.
    ///
    /// 401/403 responses map to `AuthenticationRequired` since the API
    /// probes authenticate with locally stored tokens that expire.
    pub fn classify(self) -> ProbeError {
        match self {
            HttpError::Timeout(after) => ProbeError::Timeout(after),
            HttpError::Status { status: 401 | 403, body } => {
                ProbeError::AuthenticationRequired(body)
            }
            HttpError::Request(e) if e.is_timeout() => {
                ProbeError::Timeout(Duration::from_secs(0))
            }
            other => ProbeError::ExecutionFailed(other.to_string()),
        }
    }
}

impl From<HttpError> for ProbeError {
    fn from(err: HttpError) -> Self {
        err.classify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pty_errors_classify_into_taxonomy() {
        assert_eq!(
            ProbeError::from(PtyError::NotFound("claude".into())),
            ProbeError::CliNotFound("claude".into())
        );
        assert_eq!(
            ProbeError::from(PtyError::Timeout(Duration::from_secs(8))),
            ProbeError::Timeout(Duration::from_secs(8))
        );
        assert!(matches!(
            ProbeError::from(PtyError::CreateFailed("openpty".into())),
            ProbeError::ExecutionFailed(_)
        ));
    }

    #[test]
    fn http_auth_statuses_classify_as_authentication() {
        let err = HttpError::Status {
            status: 401,
            body: "token expired".into(),
        };
        assert_eq!(
            err.classify(),
            ProbeError::AuthenticationRequired("token expired".into())
        );

        let err = HttpError::Status {
            status: 500,
            body: "oops".into(),
        };
        assert!(matches!(err.classify(), ProbeError::ExecutionFailed(_)));
    }
}
