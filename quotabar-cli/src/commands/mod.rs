//! CLI subcommand implementations.

pub mod providers;
pub mod usage;
pub mod watch;

use anyhow::Result;
use quotabar_core::{NoopObserver, Probe, StatusObserver};
use quotabar_monitor::Monitor;
use quotabar_providers::{ProbeContext, ProviderRegistry};
use std::sync::Arc;

use crate::exit_codes;

/// Builds a monitor over the requested provider, or all of them.
///
/// Returns the provider-missing exit code when the name is unknown.
pub(crate) fn build_monitor(
    provider: Option<&str>,
    observer: Option<Arc<dyn StatusObserver>>,
) -> Result<Monitor, i32> {
    let ctx = ProbeContext::new();
    let probes: Vec<Arc<dyn Probe>> = match provider {
        Some(name) => {
            let Some(desc) = ProviderRegistry::get_by_name(name) else {
                eprintln!("unknown provider: {name}");
                return Err(exit_codes::PROVIDER_MISSING);
            };
            vec![Arc::from(desc.build(&ctx))]
        }
        None => ProviderRegistry::build_probes(&ctx)
            .into_iter()
            .map(Arc::from)
            .collect(),
    };
    let observer = observer.unwrap_or_else(|| Arc::new(NoopObserver));
    Ok(Monitor::with_observer(probes, observer))
}
