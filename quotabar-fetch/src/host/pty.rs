//! PTY-based command execution for interactive CLI tools.
//!
//! Several of the probed CLIs render their usage screens only when they
//! detect a real TTY: attached to a pipe they either refuse to start or
//! fall back to an output format without quota meters. The runner therefore
//! spawns the target on a pseudo-terminal, feeds scripted responses to
//! interactive prompts through a [`ResponseEngine`], and captures the raw
//! byte stream for the terminal renderer.
//!
//! Descriptor hygiene: the child is killed and reaped and the PTY pair is
//! dropped on every exit path, including overall timeout, idle timeout, and
//! stop-pattern exits.

use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace, warn};

use crate::error::PtyError;
use crate::host::locate;
use crate::respond::{AutoResponse, ResponseEngine};

// ============================================================================
// Constants
// ============================================================================

/// Default terminal width in columns.
const DEFAULT_COLS: u16 = 120;

/// Default terminal height in rows.
const DEFAULT_ROWS: u16 = 40;

/// Default overall timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffer size for reading from the PTY master.
const READ_BUFFER_SIZE: usize = 4096;

/// Polling interval while waiting for output.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Time to keep reading after a stop pattern matched, so a final redraw
/// is not cut off mid-frame.
const DEFAULT_SETTLE_TIME: Duration = Duration::from_millis(150);

// ============================================================================
// PTY Options
// ============================================================================

/// Configuration for one PTY execution.
#[derive(Debug, Clone)]
pub struct PtyOptions {
    /// Arguments passed to the binary.
    pub args: Vec<String>,
    /// Input written to the PTY once the process is up (typically a slash
    /// command plus newline).
    pub input: Option<String>,
    /// Hard deadline for the whole run.
    pub timeout: Duration,
    /// Idle window with no output after which the capture is considered
    /// complete. Interactive TUIs never exit on their own; this is how
    /// their final frame is harvested.
    pub idle_timeout: Option<Duration>,
    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Scripted responses to interactive prompts.
    pub auto_responses: Vec<AutoResponse>,
    /// Substrings that end the capture early once seen in the output.
    pub stop_on: Vec<String>,
    /// How long to keep reading after a stop pattern matched.
    pub settle_after_stop: Duration,
    /// Terminal width advertised to the child.
    pub cols: u16,
    /// Terminal height advertised to the child.
    pub rows: u16,
}

impl Default for PtyOptions {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            input: None,
            timeout: DEFAULT_TIMEOUT,
            idle_timeout: None,
            working_dir: None,
            env: Vec::new(),
            auto_responses: Vec::new(),
            stop_on: Vec::new(),
            settle_after_stop: DEFAULT_SETTLE_TIME,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl PtyOptions {
    /// Options with just a deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the initial input.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Sets the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Sets the working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Adds an auto-response rule.
    pub fn respond(mut self, rule: AutoResponse) -> Self {
        self.auto_responses.push(rule);
        self
    }

    /// Adds a stop pattern.
    pub fn stop_on(mut self, pattern: impl Into<String>) -> Self {
        self.stop_on.push(pattern.into());
        self
    }

    /// Adds multiple stop patterns.
    pub fn stop_on_any(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stop_on.extend(patterns.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Capture & Result
// ============================================================================

/// Raw capture from a PTY execution.
#[derive(Debug, Clone)]
pub struct PtyCapture {
    /// Raw bytes read from the PTY master, escape sequences included.
    pub raw: Vec<u8>,
    /// Exit code, when the child exited on its own.
    pub exit_code: Option<i32>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Stop pattern that ended the capture, if any.
    pub stopped_on: Option<String>,
    /// Whether the overall deadline was hit.
    pub timed_out: bool,
    /// Whether the idle window elapsed with no output.
    pub idle_timed_out: bool,
}

impl PtyCapture {
    /// Returns true if the capture ended by deliberate harvest (clean exit,
    /// idle settle, or stop pattern) rather than the hard deadline.
    pub fn completed(&self) -> bool {
        !self.timed_out
    }
}

/// The flat executor contract: rendered-ready output plus exit code.
#[derive(Debug, Clone)]
pub struct CliResult {
    /// Captured output (raw; render before parsing).
    pub output: String,
    /// Exit code; `-1` when the child was killed by the harvest.
    pub exit_code: i32,
}

impl CliResult {
    /// Returns true if the child exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// ============================================================================
// PTY Runner
// ============================================================================

/// PTY-backed command runner.
#[derive(Debug, Clone, Default)]
pub struct PtyRunner;

impl PtyRunner {
    /// Creates a runner.
    pub fn new() -> Self {
        Self
    }

    /// Runs a command attached to a PTY and captures its raw output.
    ///
    /// A capture that ends via idle timeout or stop pattern is a success --
    /// that is how interactive TUIs are harvested. Only spawn failures and
    /// the hard deadline produce errors.
    #[instrument(skip(self, options), fields(binary = %binary))]
    pub async fn run(&self, binary: &str, options: PtyOptions) -> Result<PtyCapture, PtyError> {
        let binary_path = locate::locate(binary).ok_or_else(|| {
            warn!(binary = %binary, "Binary not found");
            PtyError::NotFound(binary.to_string())
        })?;

        debug!(
            binary_path = %binary_path.display(),
            timeout = ?options.timeout,
            idle_timeout = ?options.idle_timeout,
            "Starting PTY command"
        );

        let capture = tokio::task::spawn_blocking(move || run_pty_blocking(binary_path, options))
            .await
            .map_err(|e| PtyError::SpawnFailed(format!("task join error: {e}")))??;

        debug!(
            duration = ?capture.duration,
            exit_code = ?capture.exit_code,
            raw_len = capture.raw.len(),
            stopped_on = ?capture.stopped_on,
            timed_out = capture.timed_out,
            "PTY command completed"
        );

        if capture.timed_out {
            return Err(PtyError::Timeout(capture.duration));
        }
        Ok(capture)
    }

    /// Runs a command and returns the flat [`CliResult`] contract.
    pub async fn execute(&self, binary: &str, options: PtyOptions) -> Result<CliResult, PtyError> {
        let capture = self.run(binary, options).await?;
        Ok(CliResult {
            output: String::from_utf8_lossy(&capture.raw).to_string(),
            exit_code: capture.exit_code.unwrap_or(-1),
        })
    }
}

// ============================================================================
// Blocking implementation
// ============================================================================

/// Message from the reader thread.
enum PtyMessage {
    Data(Vec<u8>),
    Error(std::io::Error),
    Closed,
}

/// Reasons the capture loop ended.
enum LoopExit {
    ChildExited,
    TimedOut,
    IdleTimedOut,
    StoppedOn(String),
}

fn run_pty_blocking(binary_path: PathBuf, options: PtyOptions) -> Result<PtyCapture, PtyError> {
    let start = Instant::now();

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: options.rows,
            cols: options.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| PtyError::CreateFailed(e.to_string()))?;

    let mut cmd = CommandBuilder::new(&binary_path);
    cmd.args(&options.args);
    if let Some(ref dir) = options.working_dir {
        cmd.cwd(dir);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }
    cmd.env("TERM", "xterm-256color");

    let mut child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| PtyError::SpawnFailed(e.to_string()))?;

    // The slave side belongs to the child now; dropping our handle keeps
    // the master from seeing a phantom open slave after the child exits.
    drop(pair.slave);

    let mut writer = pair
        .master
        .take_writer()
        .map_err(|e| PtyError::CreateFailed(format!("failed to get PTY writer: {e}")))?;
    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| PtyError::CreateFailed(format!("failed to get PTY reader: {e}")))?;

    let (tx, rx) = mpsc::channel::<PtyMessage>();
    let _reader_handle = thread::spawn(move || read_pty_output(reader, tx));

    if let Some(ref input) = options.input {
        trace!(input_len = input.len(), "Sending input to PTY");
        writer.write_all(input.as_bytes()).map_err(PtyError::Io)?;
        writer.flush().map_err(PtyError::Io)?;
    }

    let mut engine = ResponseEngine::new(options.auto_responses.clone());
    let mut raw = Vec::new();
    let mut seen_text = String::new();
    let mut last_output = Instant::now();
    let mut stop: Option<(String, Instant)> = None;

    let exit = loop {
        let elapsed = start.elapsed();

        if elapsed >= options.timeout {
            debug!("Overall timeout reached");
            break LoopExit::TimedOut;
        }

        if let Some(idle) = options.idle_timeout {
            if last_output.elapsed() >= idle {
                debug!("Idle timeout reached");
                break LoopExit::IdleTimedOut;
            }
        }

        if let Some((ref pattern, at)) = stop {
            if at.elapsed() >= options.settle_after_stop {
                debug!(pattern = %pattern, "Stop pattern settled");
                break LoopExit::StoppedOn(pattern.clone());
            }
        }

        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(PtyMessage::Data(data)) => {
                last_output = Instant::now();
                raw.extend_from_slice(&data);

                // Respond to prompts through the rule engine.
                for response in engine.feed(&data) {
                    trace!(response_len = response.len(), "Auto-responding to prompt");
                    if let Err(e) = writer.write_all(response.as_bytes()) {
                        warn!(error = %e, "Failed to write auto-response");
                    }
                    let _ = writer.flush();
                }

                // Stop patterns match on stripped text, same as triggers.
                if stop.is_none() && !options.stop_on.is_empty() {
                    let stripped = strip_ansi_escapes::strip(&data);
                    seen_text.push_str(&String::from_utf8_lossy(&stripped));
                    for pattern in &options.stop_on {
                        if seen_text.contains(pattern) {
                            debug!(pattern = %pattern, "Stop pattern matched");
                            stop = Some((pattern.clone(), Instant::now()));
                            break;
                        }
                    }
                }
            }
            Ok(PtyMessage::Error(e)) => {
                // The child may still be running; a read error alone does
                // not end the capture.
                warn!(error = %e, "PTY read error");
            }
            Ok(PtyMessage::Closed) => {
                debug!("PTY closed");
                break LoopExit::ChildExited;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Ok(Some(_status)) = child.try_wait() {
                    // Drain whatever the reader still has buffered.
                    thread::sleep(Duration::from_millis(50));
                    while let Ok(PtyMessage::Data(data)) = rx.try_recv() {
                        raw.extend_from_slice(&data);
                    }
                    break LoopExit::ChildExited;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                debug!("Reader thread disconnected");
                break LoopExit::ChildExited;
            }
        }
    };

    // Harvest paths kill the child; every path reaps it so no zombie
    // outlives the call, and the PTY pair drops with this frame.
    let exit_code = match exit {
        LoopExit::ChildExited => child.wait().ok().map(|status| status.exit_code() as i32),
        LoopExit::TimedOut | LoopExit::IdleTimedOut | LoopExit::StoppedOn(_) => {
            let _ = child.kill();
            let _ = child.wait();
            None
        }
    };

    Ok(PtyCapture {
        raw,
        exit_code,
        duration: start.elapsed(),
        stopped_on: match &exit {
            LoopExit::StoppedOn(p) => Some(p.clone()),
            _ => None,
        },
        timed_out: matches!(exit, LoopExit::TimedOut),
        idle_timed_out: matches!(exit, LoopExit::IdleTimedOut),
    })
}

/// Reader-thread loop: forward chunks until EOF or error.
fn read_pty_output(mut reader: Box<dyn Read + Send>, tx: mpsc::Sender<PtyMessage>) {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => {
                let _ = tx.send(PtyMessage::Closed);
                break;
            }
            Ok(n) => {
                if tx.send(PtyMessage::Data(buffer[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(PtyMessage::Error(e));
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

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let runner = PtyRunner::new();
        let result = runner
            .run(
                "definitely_not_a_real_command_xyz123",
                PtyOptions::with_timeout(Duration::from_secs(2)),
            )
            .await;
        assert!(matches!(result, Err(PtyError::NotFound(_))));
    }

    #[tokio::test]
    async fn captures_shell_output() {
        let runner = PtyRunner::new();
        let options = PtyOptions::with_timeout(Duration::from_secs(5))
            .arg("-c")
            .arg("echo quota-probe-output")
            .with_idle_timeout(Duration::from_millis(500));

        let capture = runner.run("sh", options).await.unwrap();
        let text = String::from_utf8_lossy(&capture.raw);
        assert!(text.contains("quota-probe-output"));
        assert!(capture.completed());
    }

    #[tokio::test]
    async fn hard_timeout_is_an_error_and_reaps_child() {
        let runner = PtyRunner::new();
        let options = PtyOptions::with_timeout(Duration::from_millis(200))
            .arg("-c")
            .arg("sleep 10");

        let result = runner.run("sh", options).await;
        assert!(matches!(result, Err(PtyError::Timeout(_))));
    }

    #[tokio::test]
    async fn idle_timeout_harvests_interactive_tool() {
        let runner = PtyRunner::new();
        // cat with no input produces no output: the idle window ends the
        // capture without an error.
        let options = PtyOptions::with_timeout(Duration::from_secs(10))
            .with_idle_timeout(Duration::from_millis(200));

        let capture = runner.run("cat", options).await.unwrap();
        assert!(capture.idle_timed_out);
        assert!(capture.completed());
    }

    #[tokio::test]
    async fn stop_pattern_ends_capture() {
        let runner = PtyRunner::new();
        let options = PtyOptions::with_timeout(Duration::from_secs(10))
            .arg("-c")
            .arg("echo BEGIN; echo SENTINEL-DONE; sleep 10")
            .stop_on("SENTINEL-DONE");

        let capture = runner.run("sh", options).await.unwrap();
        assert_eq!(capture.stopped_on.as_deref(), Some("SENTINEL-DONE"));
        assert!(capture.completed());
    }

    #[tokio::test]
    async fn auto_response_answers_prompt() {
        let runner = PtyRunner::new();
        let options = PtyOptions::with_timeout(Duration::from_secs(10))
            .arg("-c")
            .arg("printf 'proceed? '; read answer; echo \"got:$answer\"")
            .with_idle_timeout(Duration::from_millis(500))
            .respond(AutoResponse::once("proceed?", "yes\n"));

        let capture = runner.run("sh", options).await.unwrap();
        let text = String::from_utf8_lossy(&capture.raw);
        assert!(text.contains("got:yes"), "output was: {text}");
    }

    #[tokio::test]
    async fn execute_returns_flat_contract() {
        let runner = PtyRunner::new();
        let options = PtyOptions::with_timeout(Duration::from_secs(5))
            .arg("-c")
            .arg("exit 0")
            .with_idle_timeout(Duration::from_millis(500));

        let result = runner.execute("sh", options).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(result.success());
    }
}
