//! Subprocess probe for Copilot via `gh`.
//!
//! `gh` renders fine on a pipe, so no PTY is involved; the plain runner
//! with a deadline is enough.

use async_trait::async_trait;
use quotabar_core::{Probe, ProbeError, ProviderId, UsageSnapshot};
use quotabar_fetch::host::locate;
use quotabar_fetch::host::process::ProcessRunner;
use quotabar_fetch::ProbeSettings;
use tracing::instrument;

use super::parser::parse_quota_output;

/// Probes Copilot usage through `gh copilot quota`.
#[derive(Debug, Clone)]
pub struct CopilotProbe {
    runner: ProcessRunner,
    settings: ProbeSettings,
}

impl CopilotProbe {
    /// Creates a probe with the given settings.
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            runner: ProcessRunner::new(),
            settings,
        }
    }

    fn binary(&self) -> &'static str {
        ProviderId::Copilot.cli_binary()
    }
}

#[async_trait]
impl Probe for CopilotProbe {
    fn provider(&self) -> ProviderId {
        ProviderId::Copilot
    }

    fn is_available(&self) -> bool {
        locate::locate_with_override(self.binary(), self.settings.binary_override_env.as_deref())
            .is_some()
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError> {
        let output = self
            .runner
            .run_with_timeout(self.binary(), &["copilot", "quota"], self.settings.timeout)
            .await?;

        // gh prints auth guidance on stderr with a non-zero exit; banner
        // detection runs over both streams so that still classifies.
        let combined = if output.stderr.is_empty() {
            output.stdout.clone()
        } else {
            format!("{}\n{}", output.stdout, output.stderr)
        };
        parse_quota_output(&combined)
    }
}
