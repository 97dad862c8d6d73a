//! Codex probe: RPC first, TTY capture as fallback.
//!
//! Callers never observe which path succeeded; both produce a
//! [`UsageSnapshot`] or a classified [`ProbeError`].

use async_trait::async_trait;
use quotabar_core::{Probe, ProbeError, ProviderId, UsageSnapshot};
use quotabar_fetch::host::locate;
use quotabar_fetch::{ProbeSettings, PtyOptions, PtyRunner, TerminalRenderer};
use tracing::{debug, instrument, warn};

use super::parser::{parse_status_screen, snapshot_from_rate_limits};
use super::rpc::{CodexRpcClient, RpcFailure};

const PTY_COLS: u16 = 120;
const PTY_ROWS: u16 = 40;

/// Patterns marking the `/status` screen as fully drawn. These are footer
/// lines; matching a header would cut the capture before the meters draw.
const STOP_PATTERNS: &[&str] = &["Account:", "send a message"];

/// Probes Codex usage via the app-server, degrading to PTY capture.
#[derive(Debug, Clone)]
pub struct CodexProbe {
    runner: PtyRunner,
    renderer: TerminalRenderer,
    settings: ProbeSettings,
}

impl CodexProbe {
    /// Creates a probe with the given settings.
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            runner: PtyRunner::new(),
            renderer: TerminalRenderer::for_cols(PTY_COLS),
            settings,
        }
    }

    fn binary(&self) -> &'static str {
        ProviderId::Codex.cli_binary()
    }

    /// Structured path: JSON-RPC over the app-server's stdio.
    async fn probe_rpc(&self) -> Result<UsageSnapshot, RpcFailure> {
        let override_env = self.settings.binary_override_env.clone();
        let timeout = self.settings.timeout;

        let handle = tokio::task::spawn_blocking(move || {
            let mut client = CodexRpcClient::connect(override_env.as_deref())?;
            let limits = client.fetch_rate_limits()?;
            let account = client.fetch_account();
            Ok::<_, RpcFailure>((limits, account))
        });

        let (limits, account) = tokio::time::timeout(timeout, handle)
            .await
            .map_err(|_| RpcFailure::Timeout(timeout))?
            .map_err(|e| RpcFailure::Io(format!("task join error: {e}")))??;

        snapshot_from_rate_limits(limits.rate_limits, account)
            .map_err(|e| RpcFailure::Io(e.to_string()))
    }

    /// Fallback path: interactive `/status` capture.
    async fn probe_tty(&self) -> Result<UsageSnapshot, ProbeError> {
        let mut options = PtyOptions::with_timeout(self.settings.timeout)
            .with_input("/status\n")
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
        parse_status_screen(&rendered)
    }
}

#[async_trait]
impl Probe for CodexProbe {
    fn provider(&self) -> ProviderId {
        ProviderId::Codex
    }

    fn is_available(&self) -> bool {
        locate::locate_with_override(self.binary(), self.settings.binary_override_env.as_deref())
            .is_some()
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError> {
        match self.probe_rpc().await {
            Ok(snapshot) => {
                debug!("Codex usage fetched via RPC");
                Ok(snapshot)
            }
            Err(RpcFailure::BinaryNotFound) => {
                Err(ProbeError::CliNotFound(self.binary().to_string()))
            }
            Err(failure) => {
                warn!(error = %failure, "RPC path failed, falling back to TTY capture");
                self.probe_tty().await
            }
        }
    }
}
