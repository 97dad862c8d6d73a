//! PTY probe for the Antigravity CLI.

use async_trait::async_trait;
use quotabar_core::{Probe, ProbeError, ProviderId, UsageSnapshot};
use quotabar_fetch::host::locate;
use quotabar_fetch::{ProbeSettings, PtyOptions, PtyRunner, TerminalRenderer};
use tracing::instrument;

use super::parser::parse_quota_table;

const PTY_COLS: u16 = 120;
const PTY_ROWS: u16 = 40;

/// Probes Antigravity's per-model quota table.
#[derive(Debug, Clone)]
pub struct AntigravityProbe {
    runner: PtyRunner,
    renderer: TerminalRenderer,
    settings: ProbeSettings,
}

impl AntigravityProbe {
    /// Creates a probe with the given settings.
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            runner: PtyRunner::new(),
            renderer: TerminalRenderer::for_cols(PTY_COLS),
            settings,
        }
    }

    fn binary(&self) -> &'static str {
        ProviderId::Antigravity.cli_binary()
    }
}

#[async_trait]
impl Probe for AntigravityProbe {
    fn provider(&self) -> ProviderId {
        ProviderId::Antigravity
    }

    fn is_available(&self) -> bool {
        locate::locate_with_override(self.binary(), self.settings.binary_override_env.as_deref())
            .is_some()
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError> {
        let mut options = PtyOptions::with_timeout(self.settings.timeout)
            .arg("quota")
            .stop_on("Account:")
            .with_env("NO_COLOR", "1");
        options.cols = PTY_COLS;
        options.rows = PTY_ROWS;
        options.idle_timeout = self.settings.idle_timeout;
        if let Some(ref dir) = self.settings.working_dir {
            options = options.in_dir(dir);
        }

        let capture = self.runner.run(self.binary(), options).await?;
        let rendered = self.renderer.render(&capture.raw);
        parse_quota_table(&rendered)
    }
}
