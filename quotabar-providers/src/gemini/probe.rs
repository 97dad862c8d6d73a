//! CLI-then-API coordinator for Gemini.
//!
//! The CLI screen is the primary surface: it needs no network round-trip
//! beyond what the CLI does itself and works for accounts without API
//! access. On any CLI failure the probe logs it and retries through the
//! OAuth-backed HTTP probe; if both fail, the API error is what the caller
//! sees, since it is the more specific of the two.

use async_trait::async_trait;
use quotabar_core::{Probe, ProbeError, ProviderId, UsageSnapshot};
use quotabar_fetch::host::locate;
use quotabar_fetch::{HttpApi, ProbeSettings, PtyOptions, PtyRunner, TerminalRenderer};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::api::GeminiApiProbe;
use super::parser::parse_stats_screen;

const PTY_COLS: u16 = 120;
const PTY_ROWS: u16 = 40;

/// Patterns marking the `/stats` screen as fully drawn. The account footer
/// is the last thing the CLI prints; headers would stop the capture early.
const STOP_PATTERNS: &[&str] = &["Signed in as:"];

/// Gemini probe: CLI first, API fallback.
#[derive(Debug, Clone)]
pub struct GeminiProbe {
    runner: PtyRunner,
    renderer: TerminalRenderer,
    settings: ProbeSettings,
    api: GeminiApiProbe,
}

impl GeminiProbe {
    /// Creates a probe with the given settings and network capability.
    pub fn new(settings: ProbeSettings, http: Arc<dyn HttpApi>) -> Self {
        let api = GeminiApiProbe::new(http, settings.credential_path.clone());
        Self {
            runner: PtyRunner::new(),
            renderer: TerminalRenderer::for_cols(PTY_COLS),
            settings,
            api,
        }
    }

    fn binary(&self) -> &'static str {
        ProviderId::Gemini.cli_binary()
    }

    async fn probe_cli(&self) -> Result<UsageSnapshot, ProbeError> {
        let mut options = PtyOptions::with_timeout(self.settings.timeout)
            .with_input("/stats\n")
            .stop_on_any(STOP_PATTERNS.iter().copied())
            .with_env("NO_COLOR", "1");
        options.cols = PTY_COLS;
        options.rows = PTY_ROWS;
        options.idle_timeout = self.settings.idle_timeout;
        if let Some(ref dir) = self.settings.working_dir {
            options = options.in_dir(dir);
        }

        let capture = self.runner.run(self.binary(), options).await?;
        let rendered = self.renderer.render(&capture.raw);
        parse_stats_screen(&rendered)
    }
}

#[async_trait]
impl Probe for GeminiProbe {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn is_available(&self) -> bool {
        locate::locate_with_override(self.binary(), self.settings.binary_override_env.as_deref())
            .is_some()
            || self.api.is_available()
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError> {
        match self.probe_cli().await {
            Ok(snapshot) => {
                debug!("Gemini usage fetched via CLI");
                Ok(snapshot)
            }
            Err(cli_error) => {
                warn!(error = %cli_error, "CLI probe failed, retrying via quota API");
                self.api.fetch().await
            }
        }
    }
}
