//! Quotabar command-line interface.
//!
//! Diagnostic front end over the monitor: one-shot usage queries, provider
//! availability listing, and a continuous watch mode.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Exit codes.
pub mod exit_codes {
    /// Success.
    pub const SUCCESS: i32 = 0;
    /// Unexpected failure.
    pub const UNEXPECTED_FAILURE: i32 = 1;
    /// Requested provider is unknown or not installed.
    pub const PROVIDER_MISSING: i32 = 2;
}

/// Quotabar - monitor AI coding-assistant usage quotas.
#[derive(Parser, Debug)]
#[command(name = "quotabar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level (trace, debug, info, warn, error).
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and print current usage (default command).
    Usage {
        /// Provider to query (claude, codex, gemini, antigravity, zai, copilot).
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// List providers and their availability.
    Providers,
    /// Continuously refresh and print usage until interrupted.
    Watch {
        /// Refresh interval in seconds.
        #[arg(short, long, default_value_t = 300)]
        interval: u64,

        /// Provider to watch; all providers when omitted.
        #[arg(short, long)]
        provider: Option<String>,
    },
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let level = cli.log_level.as_deref().unwrap_or(default_level);
    let directives = format!(
        "warn,quotabar={level},quotabar_core={level},quotabar_fetch={level},\
         quotabar_providers={level},quotabar_monitor={level}"
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Some(Commands::Providers) => commands::providers::run(cli.json).await,
        Some(Commands::Watch { interval, provider }) => {
            commands::watch::run(interval, provider.as_deref(), cli.json).await
        }
        Some(Commands::Usage { ref provider }) => {
            commands::usage::run(provider.as_deref(), cli.json).await
        }
        None => commands::usage::run(None, cli.json).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            exit_codes::UNEXPECTED_FAILURE
        }
    };
    std::process::exit(code);
}
