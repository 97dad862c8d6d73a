//! Codex provider: JSON-RPC to `codex app-server`, PTY `/status` fallback.

mod parser;
mod probe;
mod rpc;

pub use parser::{parse_status_screen, snapshot_from_rate_limits};
pub use probe::CodexProbe;
pub use rpc::{CodexRpcClient, RateLimits, RpcFailure};

use crate::descriptor::{ProbeContext, ProviderDescriptor};
use quotabar_core::ProviderId;

/// Descriptor for the Codex provider.
pub fn codex_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderId::Codex,
        aliases: &["openai"],
        build_probe: |ctx: &ProbeContext| Box::new(CodexProbe::new(ctx.settings.clone())),
    }
}
