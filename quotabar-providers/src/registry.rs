//! Provider registry.
//!
//! Central lookup for provider descriptors. The orchestrator builds its
//! probe set from here, so registering a provider is one entry in
//! [`init_descriptors`] plus the provider module itself.

use quotabar_core::{Probe, ProviderId};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::antigravity::antigravity_descriptor;
use crate::claude::claude_descriptor;
use crate::codex::codex_descriptor;
use crate::copilot::copilot_descriptor;
use crate::descriptor::{ProbeContext, ProviderDescriptor};
use crate::gemini::gemini_descriptor;
use crate::zai::zai_descriptor;

static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();
static CLI_NAME_MAP: OnceLock<HashMap<String, ProviderId>> = OnceLock::new();

fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        claude_descriptor(),
        codex_descriptor(),
        gemini_descriptor(),
        antigravity_descriptor(),
        zai_descriptor(),
        copilot_descriptor(),
    ]
}

fn build_cli_name_map(descriptors: &[ProviderDescriptor]) -> HashMap<String, ProviderId> {
    let mut map = HashMap::new();
    for desc in descriptors {
        map.insert(desc.id.as_str().to_string(), desc.id);
        map.insert(desc.cli_binary().to_string(), desc.id);
        for alias in desc.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }
    map
}

/// Global registry of provider descriptors.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a descriptor by provider id.
    pub fn get(id: ProviderId) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Looks up a descriptor by CLI or alias name.
    pub fn get_by_name(name: &str) -> Option<&'static ProviderDescriptor> {
        let map = CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()));
        let id = map.get(&name.to_ascii_lowercase())?;
        Self::get(*id)
    }

    /// Builds probes for every registered provider.
    pub fn build_probes(ctx: &ProbeContext) -> Vec<Box<dyn Probe>> {
        Self::all().iter().map(|d| d.build(ctx)).collect()
    }

    /// Number of registered providers.
    pub fn count() -> usize {
        Self::all().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_all_providers() {
        assert_eq!(ProviderRegistry::count(), ProviderId::ALL.len());
        for id in ProviderId::ALL {
            let desc = ProviderRegistry::get(id);
            assert!(desc.is_some(), "missing descriptor for {id:?}");
            assert_eq!(desc.unwrap().id, id);
        }
    }

    #[test]
    fn name_lookup_covers_aliases() {
        assert_eq!(
            ProviderRegistry::get_by_name("claude").unwrap().id,
            ProviderId::Claude
        );
        assert_eq!(
            ProviderRegistry::get_by_name("openai").unwrap().id,
            ProviderId::Codex
        );
        assert_eq!(
            ProviderRegistry::get_by_name("gh").unwrap().id,
            ProviderId::Copilot
        );
        assert!(ProviderRegistry::get_by_name("zed").is_none());
    }

    #[test]
    fn probes_build_for_every_descriptor() {
        let ctx = ProbeContext::new();
        let probes = ProviderRegistry::build_probes(&ctx);
        assert_eq!(probes.len(), ProviderId::ALL.len());

        let ids: Vec<_> = probes.iter().map(|p| p.provider()).collect();
        for id in ProviderId::ALL {
            assert!(ids.contains(&id));
        }
    }
}
