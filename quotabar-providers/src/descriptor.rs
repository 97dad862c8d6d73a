//! Provider descriptors.
//!
//! A descriptor ties a provider id to its probe factory. The orchestrator
//! builds probes through descriptors only, so adding a provider means
//! adding a module and one registry entry.

use quotabar_core::{Probe, ProviderId};
use quotabar_fetch::{HttpApi, HttpClient, ProbeSettings};
use std::sync::Arc;

/// Shared dependencies injected into probe construction.
#[derive(Clone)]
pub struct ProbeContext {
    /// Read-only probe configuration.
    pub settings: ProbeSettings,
    /// Network capability for API-backed probes.
    pub http: Arc<dyn HttpApi>,
}

impl ProbeContext {
    /// Context with default settings and the production HTTP client.
    pub fn new() -> Self {
        Self::with_settings(ProbeSettings::default())
    }

    /// Context with custom settings.
    pub fn with_settings(settings: ProbeSettings) -> Self {
        Self {
            settings,
            http: Arc::new(HttpClient::new()),
        }
    }

    /// Replaces the HTTP capability (tests inject doubles here).
    pub fn with_http(mut self, http: Arc<dyn HttpApi>) -> Self {
        self.http = http;
        self
    }
}

impl Default for ProbeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Static configuration for one provider.
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderId,
    /// Alternative CLI names accepted on the command line.
    pub aliases: &'static [&'static str],
    /// Builds the probe for this provider.
    pub build_probe: fn(&ProbeContext) -> Box<dyn Probe>,
}

impl ProviderDescriptor {
    /// Display name, from the provider id.
    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    /// CLI binary name, from the provider id.
    pub fn cli_binary(&self) -> &'static str {
        self.id.cli_binary()
    }

    /// Builds this provider's probe.
    pub fn build(&self, ctx: &ProbeContext) -> Box<dyn Probe> {
        (self.build_probe)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder() {
        let ctx = ProbeContext::new();
        assert_eq!(ctx.settings.timeout, ProbeSettings::default().timeout);
    }
}
