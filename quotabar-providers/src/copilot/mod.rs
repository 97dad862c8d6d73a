//! Copilot provider: `gh` premium-request quota.

mod parser;
mod probe;

pub use parser::parse_quota_output;
pub use probe::CopilotProbe;

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Copilot provider.
pub fn copilot_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Copilot,
        aliases: &["gh"],
        build_probe: |ctx: &ProbeContext| Box::new(CopilotProbe::new(ctx.settings.clone())),
    }
}
