//! The closed probe error taxonomy.
//!
//! Every failure at the execution or parsing layer is converted into one of
//! these kinds before it leaves a probe. Raw OS/process errors and parser
//! panics never cross the probe boundary unclassified.

use std::time::Duration;
use thiserror::Error;

/// Classified failure signal produced by a probe.
///
/// All variants are soft from the orchestrator's point of view: they are
/// recorded on the affected provider and retried on the next refresh cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// The provider's CLI binary could not be located.
    #[error("CLI not found: {0}")]
    CliNotFound(String),

    /// The CLI reported an expired or missing login.
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// Output was captured but could not be interpreted.
    #[error("failed to parse output: {0}")]
    ParseFailed(String),

    /// The probe exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The CLI ran and produced output, but no usage data was present.
    #[error("no usage data in output")]
    NoData,

    /// The installed CLI version no longer supports the probed surface.
    #[error("CLI update required: {0}")]
    UpdateRequired(String),

    /// The CLI is blocked on an interactive folder-trust confirmation.
    #[error("folder trust confirmation required")]
    FolderTrustRequired,

    /// The process could not be spawned or failed in an unclassified way.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The account's billing mode does not include the queried quota surface.
    #[error("subscription required: {0}")]
    SubscriptionRequired(String),
}

impl ProbeError {
    /// Returns a short machine-readable kind label, used in logs and
    /// JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CliNotFound(_) => "cli_not_found",
            Self::AuthenticationRequired(_) => "authentication_required",
            Self::ParseFailed(_) => "parse_failed",
            Self::Timeout(_) => "timeout",
            Self::NoData => "no_data",
            Self::UpdateRequired(_) => "update_required",
            Self::FolderTrustRequired => "folder_trust_required",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::SubscriptionRequired(_) => "subscription_required",
        }
    }

    /// Returns true if the failure indicates the user must act before any
    /// retry can succeed (log in, trust the folder, upgrade the CLI).
    pub fn needs_user_action(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationRequired(_)
                | Self::FolderTrustRequired
                | Self::UpdateRequired(_)
                | Self::SubscriptionRequired(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(ProbeError::NoData.kind(), "no_data");
        assert_eq!(
            ProbeError::Timeout(Duration::from_secs(10)).kind(),
            "timeout"
        );
        assert_eq!(ProbeError::FolderTrustRequired.kind(), "folder_trust_required");
    }

    #[test]
    fn user_action_classification() {
        assert!(ProbeError::FolderTrustRequired.needs_user_action());
        assert!(ProbeError::AuthenticationRequired("run /login".into()).needs_user_action());
        assert!(!ProbeError::Timeout(Duration::from_secs(8)).needs_user_action());
        assert!(!ProbeError::ParseFailed("garbled".into()).needs_user_action());
    }
}
