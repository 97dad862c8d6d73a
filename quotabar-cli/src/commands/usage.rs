//! `quotabar usage` - one-shot refresh and print.

use anyhow::Result;

use crate::commands::build_monitor;
use crate::exit_codes;
use crate::output;

/// Runs the usage command.
pub async fn run(provider: Option<&str>, json: bool) -> Result<i32> {
    let monitor = match build_monitor(provider, None) {
        Ok(monitor) => monitor,
        Err(code) => return Ok(code),
    };

    monitor.refresh_all().await;
    let views = monitor.views().await;

    if json {
        println!("{}", output::json::render_views(&views)?);
    } else {
        print!("{}", output::text::render_views(&views));
    }

    // Asking for one specific provider that is not installed is a distinct
    // failure mode for scripting.
    if provider.is_some() && views.iter().all(|v| !v.available) {
        return Ok(exit_codes::PROVIDER_MISSING);
    }
    Ok(exit_codes::SUCCESS)
}
