//! PTY probe for the Claude CLI.

use async_trait::async_trait;
use quotabar_core::{Probe, ProbeError, ProviderId, UsageSnapshot};
use quotabar_fetch::host::locate;
use quotabar_fetch::{AutoResponse, ProbeSettings, PtyOptions, PtyRunner, TerminalRenderer};
use tracing::{debug, instrument};

use super::parser::parse_usage_screen;

/// Patterns that mark the usage screen as fully drawn. Both are footer
/// lines; the idle timeout covers CLI versions that print neither.
const STOP_PATTERNS: &[&str] = &["Login method:", "Account:"];

/// PTY width for the `/usage` screen; the meters need a wide terminal or
/// the CLI truncates labels.
const PTY_COLS: u16 = 120;
const PTY_ROWS: u16 = 40;

/// Probes Claude usage by driving the CLI's `/usage` command on a PTY.
#[derive(Debug, Clone)]
pub struct ClaudeProbe {
    runner: PtyRunner,
    renderer: TerminalRenderer,
    settings: ProbeSettings,
}

impl ClaudeProbe {
    /// Creates a probe with the given settings.
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            runner: PtyRunner::new(),
            renderer: TerminalRenderer::for_cols(PTY_COLS),
            settings,
        }
    }

    fn binary(&self) -> &'static str {
        ProviderId::Claude.cli_binary()
    }

    fn options(&self) -> PtyOptions {
        let mut options = PtyOptions::with_timeout(self.settings.timeout)
            .with_input("/usage\n")
            .stop_on_any(STOP_PATTERNS.iter().copied())
            // The trust prompt must be left unanswered: it is a classified
            // error, not something to click through on the user's behalf.
            // Theme selection on first run is safe to answer.
            .respond(AutoResponse::once("Choose the text style", "1\n"))
            .with_env("NO_COLOR", "1");
        options.cols = PTY_COLS;
        options.rows = PTY_ROWS;
        options.idle_timeout = self.settings.idle_timeout;
        if let Some(ref dir) = self.settings.working_dir {
            options = options.in_dir(dir);
        }
        options
    }
}

#[async_trait]
impl Probe for ClaudeProbe {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn is_available(&self) -> bool {
        locate::locate_with_override(self.binary(), self.settings.binary_override_env.as_deref())
            .is_some()
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError> {
        let capture = self.runner.run(self.binary(), self.options()).await?;
        let rendered = self.renderer.render(&capture.raw);
        debug!(rendered_len = rendered.len(), "Parsing /usage screen");
        parse_usage_screen(&rendered)
    }
}
