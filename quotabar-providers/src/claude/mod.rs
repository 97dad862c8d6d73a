//! Claude provider: PTY capture of the `/usage` screen.

mod parser;
mod probe;

pub use parser::parse_usage_screen;
pub use probe::ClaudeProbe;

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Claude provider.
pub fn claude_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Claude,
        aliases: &["claude-code"],
        build_probe: |ctx: &ProbeContext| Box::new(ClaudeProbe::new(ctx.settings.clone())),
    }
}
