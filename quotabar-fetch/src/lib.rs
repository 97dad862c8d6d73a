// Lint configuration for this crate
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! # `Quotabar` Fetch
//!
//! Host-facing execution layer: everything that touches a process, a
//! pseudo-terminal, or the network lives here, behind injectable
//! capabilities.
//!
//! - [`host::locate`] - binary resolution with restricted-PATH fallbacks
//! - [`host::pty`] - PTY runner with scripted responses to interactive prompts
//! - [`host::process`] - plain subprocess runner for non-interactive CLIs
//! - [`host::http`] - HTTP capability trait plus the reqwest-backed client
//! - [`render`] - terminal emulation that flattens ANSI output into the
//!   text a human would see
//! - [`respond`] - the trigger/response rule engine driving headless
//!   automation of interactive prompts

pub mod error;
pub mod host;
pub mod render;
pub mod respond;
pub mod settings;

pub use error::{HttpError, ProcessError, PtyError};
pub use host::http::{HttpApi, HttpClient, HttpRequest, HttpResponse};
pub use host::pty::{CliResult, PtyCapture, PtyOptions, PtyRunner};
pub use render::TerminalRenderer;
pub use respond::{AutoResponse, ResponseEngine};
pub use settings::ProbeSettings;
