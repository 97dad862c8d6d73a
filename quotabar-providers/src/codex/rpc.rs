//! JSON-RPC client for the Codex app-server.
//!
//! The Codex CLI exposes a structured quota surface when started as
//! `codex app-server`: JSON-RPC 2.0 messages, newline-delimited, over the
//! child's stdin/stdout. This is preferred over TTY capture because the
//! payload is versioned JSON rather than a drawn screen.
//!
//! Responses are correlated to requests by id; the server interleaves
//! notifications on the same stream, which are skipped. A dedicated reader
//! thread feeds lines through a channel so every request observes its own
//! deadline even when the server goes quiet mid-response.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use quotabar_fetch::host::locate;

// ============================================================================
// Constants
// ============================================================================

/// Arguments for app-server mode; read-only sandbox, no approvals.
const APP_SERVER_ARGS: &[&str] = &["-s", "read-only", "-a", "untrusted", "app-server"];

/// Per-request deadline.
const RPC_TIMEOUT: Duration = Duration::from_secs(8);

/// Client identity sent during initialization.
const CLIENT_NAME: &str = "quotabar";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Failure type
// ============================================================================

/// Failure on the RPC channel. Any of these triggers the TTY fallback.
#[derive(Debug, Error)]
pub enum RpcFailure {
    /// Binary not found.
    #[error("codex binary not found")]
    BinaryNotFound,

    /// Could not spawn the app-server.
    #[error("failed to spawn app-server: {0}")]
    SpawnFailed(String),

    /// The request deadline elapsed.
    #[error("RPC request timed out after {0:?}")]
    Timeout(Duration),

    /// The server closed the stream.
    #[error("app-server connection closed")]
    ConnectionClosed,

    /// The server answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i32,
        /// Error message from the server.
        message: String,
    },

    /// A correlated response carried neither result nor error.
    #[error("empty RPC response")]
    EmptyResponse,

    /// IO on the child's pipes failed.
    #[error("IO error: {0}")]
    Io(String),

    /// Request serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i32,
    message: String,
}

#[derive(Debug, Serialize)]
struct EmptyParams {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    client_info: ClientInfo,
}

#[derive(Debug, Serialize)]
struct ClientInfo {
    name: &'static str,
    version: &'static str,
}

/// Result of `account/rateLimits/read`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitsResult {
    /// Rate limit windows.
    pub rate_limits: RateLimits,
}

/// Rate limit windows reported by the app-server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    /// Session window (rolling 5 hours).
    pub primary: Option<RateLimitWindow>,
    /// Weekly window.
    pub secondary: Option<RateLimitWindow>,
}

/// One rate-limit window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitWindow {
    /// Percentage of the window consumed.
    pub used_percent: f64,
    /// Unix timestamp of the window reset.
    pub resets_at: Option<i64>,
}

/// Result of `account/read`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResult {
    /// Account email.
    pub email: Option<String>,
    /// Organization name.
    pub organization: Option<String>,
    /// Plan label (e.g. "pro").
    pub plan: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Line received from the reader thread.
enum ReaderMessage {
    Line(String),
    Closed,
}

/// Blocking JSON-RPC client over a `codex app-server` child.
///
/// The client is synchronous; callers wrap it in `spawn_blocking` and an
/// outer deadline. Dropping the client kills and reaps the child.
pub struct CodexRpcClient {
    child: Child,
    writer: ChildStdin,
    lines: mpsc::Receiver<ReaderMessage>,
    next_id: u32,
    request_timeout: Duration,
}

impl CodexRpcClient {
    /// Spawns the app-server and performs the initialize handshake.
    #[instrument(skip(binary_override))]
    pub fn connect(binary_override: Option<&str>) -> Result<Self, RpcFailure> {
        let binary = locate::locate_with_override("codex", binary_override)
            .ok_or(RpcFailure::BinaryNotFound)?;

        debug!(binary = %binary.display(), "Spawning codex app-server");

        let mut child = std::process::Command::new(&binary)
            .args(APP_SERVER_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RpcFailure::SpawnFailed(e.to_string()))?;

        let writer = child
            .stdin
            .take()
            .ok_or_else(|| RpcFailure::SpawnFailed("no stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RpcFailure::SpawnFailed("no stdout handle".to_string()))?;

        let (tx, lines) = mpsc::channel();
        thread::spawn(move || read_lines(BufReader::new(stdout), tx));

        let mut client = Self {
            child,
            writer,
            lines,
            next_id: 1,
            request_timeout: RPC_TIMEOUT,
        };

        client.initialize()?;
        Ok(client)
    }

    /// Sets the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn initialize(&mut self) -> Result<(), RpcFailure> {
        let params = InitializeParams {
            client_info: ClientInfo {
                name: CLIENT_NAME,
                version: CLIENT_VERSION,
            },
        };
        let _: serde_json::Value = self.call("initialize", params)?;
        debug!("App-server initialized");
        Ok(())
    }

    /// Fetches the rate-limit windows.
    #[instrument(skip(self))]
    pub fn fetch_rate_limits(&mut self) -> Result<RateLimitsResult, RpcFailure> {
        let value = self.call("account/rateLimits/read", EmptyParams {})?;
        serde_json::from_value(value).map_err(|e| RpcFailure::Serialization(e.to_string()))
    }

    /// Fetches account metadata. Optional surface: older servers do not
    /// implement it, so RPC errors degrade to an empty account.
    #[instrument(skip(self))]
    pub fn fetch_account(&mut self) -> AccountResult {
        match self.call("account/read", EmptyParams {}) {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(e) => {
                debug!(error = %e, "account/read unavailable");
                AccountResult::default()
            }
        }
    }

    /// Issues one request and waits for its correlated response.
    fn call<P: Serialize>(
        &mut self,
        method: &str,
        params: P,
    ) -> Result<serde_json::Value, RpcFailure> {
        let id = self.next_id;
        self.next_id += 1;

        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let json = serde_json::to_string(&request)
            .map_err(|e| RpcFailure::Serialization(e.to_string()))?;

        trace!(json = %json, "Sending request");
        writeln!(self.writer, "{json}").map_err(|e| RpcFailure::Io(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| RpcFailure::Io(e.to_string()))?;

        let deadline = Instant::now() + self.request_timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(RpcFailure::Timeout(self.request_timeout))?;

            match self.lines.recv_timeout(remaining) {
                Ok(ReaderMessage::Line(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    trace!(line = %line, "Received line");

                    let Ok(envelope) = serde_json::from_str::<RpcEnvelope>(line) else {
                        // Malformed frame; skip, the deadline bounds us.
                        continue;
                    };
                    // Notifications and other ids are not ours.
                    if envelope.id != Some(id) {
                        continue;
                    }
                    if let Some(error) = envelope.error {
                        return Err(RpcFailure::Rpc {
                            code: error.code,
                            message: error.message,
                        });
                    }
                    return envelope.result.ok_or(RpcFailure::EmptyResponse);
                }
                Ok(ReaderMessage::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(RpcFailure::ConnectionClosed);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(RpcFailure::Timeout(self.request_timeout));
                }
            }
        }
    }

    /// Kills and reaps the child.
    pub fn shutdown(&mut self) {
        debug!("Shutting down app-server");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for CodexRpcClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_lines<R: BufRead>(mut reader: R, tx: mpsc::Sender<ReaderMessage>) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                let _ = tx.send(ReaderMessage::Closed);
                break;
            }
            Ok(_) => {
                if tx.send(ReaderMessage::Line(line.clone())).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "app-server read error");
                let _ = tx.send(ReaderMessage::Closed);
                break;
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_deserialize() {
        let json = r#"{
            "rateLimits": {
                "primary": {"usedPercent": 28.5, "resetsAt": 1735000000},
                "secondary": {"usedPercent": 59.2, "resetsAt": 1735100000}
            }
        }"#;

        let result: RateLimitsResult = serde_json::from_str(json).unwrap();
        let primary = result.rate_limits.primary.unwrap();
        assert!((primary.used_percent - 28.5).abs() < 0.01);
        assert_eq!(primary.resets_at, Some(1_735_000_000));
    }

    #[test]
    fn envelope_skips_notifications() {
        let notification = r#"{"jsonrpc":"2.0","method":"sessionConfigured","params":{}}"#;
        let envelope: RpcEnvelope = serde_json::from_str(notification).unwrap();
        assert_eq!(envelope.id, None);
    }

    #[test]
    fn envelope_carries_error() {
        let json = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32600,"message":"Invalid request"}}"#;
        let envelope: RpcEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.id, Some(1));
        assert_eq!(envelope.error.unwrap().code, -32600);
    }

    #[test]
    fn account_deserialize_with_missing_fields() {
        let result: AccountResult = serde_json::from_str(r#"{"email":"u@e.com"}"#).unwrap();
        assert_eq!(result.email.as_deref(), Some("u@e.com"));
        assert!(result.plan.is_none());
    }
}
