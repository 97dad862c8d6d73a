//! `quotabar watch` - continuous monitoring until Ctrl-C.

use anyhow::Result;
use quotabar_core::{ProviderId, QuotaStatus, StatusObserver};
use quotabar_monitor::MonitorEvent;
use std::sync::Arc;
use std::time::Duration;

use crate::commands::build_monitor;
use crate::exit_codes;
use crate::output;

/// Observer that prints transitions as they happen.
struct PrintingObserver;

impl StatusObserver for PrintingObserver {
    fn on_status_changed(&self, provider: ProviderId, old: QuotaStatus, new: QuotaStatus) {
        println!("! {provider} status changed: {old} -> {new}");
    }
}

/// Runs the watch command.
pub async fn run(interval_secs: u64, provider: Option<&str>, json: bool) -> Result<i32> {
    let monitor = match build_monitor(provider, Some(Arc::new(PrintingObserver))) {
        Ok(monitor) => monitor,
        Err(code) => return Ok(code),
    };

    let mut events = monitor
        .start_monitoring(Duration::from_secs(interval_secs.max(1)))
        .await;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(MonitorEvent::Refreshed { cycle }) => {
                        let views = monitor.views().await;
                        if json {
                            println!("{}", output::json::render_views(&views)?);
                        } else {
                            println!("-- refresh #{cycle} --");
                            print!("{}", output::text::render_views(&views));
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                monitor.stop_monitoring().await;
                break;
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}
