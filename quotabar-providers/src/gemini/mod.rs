//! Gemini provider: CLI stats screen first, OAuth-backed API fallback.

mod api;
mod parser;
mod probe;

pub use api::{GeminiApiProbe, GeminiCredentials};
pub use parser::{parse_quota_response, parse_stats_screen};
pub use probe::GeminiProbe;

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Gemini provider.
pub fn gemini_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Gemini,
        aliases: &["gemini-cli"],
        build_probe: |ctx: &ProbeContext| {
            Box::new(GeminiProbe::new(ctx.settings.clone(), ctx.http.clone()))
        },
    }
}
