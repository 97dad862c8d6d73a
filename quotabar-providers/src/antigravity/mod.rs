//! Antigravity provider: per-model quota table.

mod parser;
mod probe;

pub use parser::parse_quota_table;
pub use probe::AntigravityProbe;

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Antigravity provider.
pub fn antigravity_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Antigravity,
        aliases: &[],
        build_probe: |ctx: &ProbeContext| Box::new(AntigravityProbe::new(ctx.settings.clone())),
    }
}
