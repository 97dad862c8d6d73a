//! Z.ai provider: usage blocks with named time-limit windows.

mod parser;
mod probe;

pub use parser::parse_usage_blocks;
pub use probe::ZaiProbe;

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Z.ai provider.
pub fn zai_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Zai,
        aliases: &["z.ai"],
        build_probe: |ctx: &ProbeContext| Box::new(ZaiProbe::new(ctx.settings.clone())),
    }
}
