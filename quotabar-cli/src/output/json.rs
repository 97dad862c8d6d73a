//! JSON output.

use anyhow::Result;
use quotabar_monitor::ProviderView;
use serde_json::json;

/// Renders provider views as a pretty-printed JSON array.
pub fn render_views(views: &[ProviderView]) -> Result<String> {
    let entries: Vec<serde_json::Value> = views
        .iter()
        .map(|view| {
            json!({
                "provider": view.id.as_str(),
                "available": view.available,
                "status": view.status().map(|s| s.label()),
                "snapshot": &view.snapshot,
                "error": view.last_error.as_ref().map(|e| json!({
                    "kind": e.kind(),
                    "message": e.to_string(),
                })),
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotabar_core::{ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot};

    #[test]
    fn renders_snapshot_and_error_shape() {
        let snapshot = UsageSnapshot::new(
            ProviderId::Codex,
            vec![UsageQuota::new(ProviderId::Codex, QuotaKind::Weekly, 41.0)],
        );
        let views = vec![
            ProviderView {
                id: ProviderId::Codex,
                available: true,
                snapshot: Some(snapshot),
                last_error: None,
                syncing: false,
            },
            ProviderView {
                id: ProviderId::Claude,
                available: true,
                snapshot: None,
                last_error: Some(ProbeError::FolderTrustRequired),
                syncing: false,
            },
        ];

        let rendered = render_views(&views).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed[0]["provider"], "codex");
        assert_eq!(parsed[0]["status"], "warning");
        assert_eq!(parsed[0]["snapshot"]["quotas"][0]["kind"], "weekly");
        assert_eq!(parsed[1]["error"]["kind"], "folder_trust_required");
    }
}
