//! Parsers for Gemini quota surfaces.
//!
//! The CLI's `/stats` screen reports daily model usage; the Cloud Code
//! quota API reports the same data as JSON on the fallback path.

use quotabar_core::{ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot};
use serde::Deserialize;
use tracing::warn;

use crate::textscan;

// ============================================================================
// CLI /stats screen
// ============================================================================

/// Parses the rendered `/stats` screen.
///
/// ```text
/// Daily usage (resets midnight UTC)
///
/// gemini-2.5-pro      12% used
/// gemini-2.5-flash     3% used
///
/// Signed in as: user@gmail.com
/// ```
pub fn parse_stats_screen(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let reset = textscan::reset_text(text);

    let mut quotas = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let Some(remaining) = textscan::percent_remaining(line) else {
            continue;
        };
        let Some(model) = model_label(line) else {
            continue;
        };
        let mut quota = UsageQuota::new(ProviderId::Gemini, QuotaKind::Model(model), remaining);
        if let Some(ref reset) = reset {
            quota = quota.with_reset_text(reset.clone());
        }
        quotas.push(quota);
    }

    if quotas.is_empty() {
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Gemini, quotas);
    if let Some(email) = textscan::account_email(text) {
        snapshot = snapshot.with_account(quotabar_core::AccountInfo {
            email: Some(email),
            ..Default::default()
        });
    }
    Ok(snapshot)
}

/// Extracts the model name preceding the percent on a meter line.
fn model_label(line: &str) -> Option<String> {
    let percent_pos = line.find('%')?;
    let before = &line[..percent_pos];
    // Strip the numeric part back off the label.
    let label: String = before
        .trim_end()
        .trim_end_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim_end_matches(':')
        .trim()
        .to_string();
    if label.is_empty() || !label.starts_with("gemini") {
        return None;
    }
    Some(label)
}

// ============================================================================
// Quota API response
// ============================================================================

/// Response from the Cloud Code quota endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaResponse {
    #[serde(default)]
    buckets: Vec<QuotaBucket>,
    #[serde(default)]
    account_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaBucket {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    remaining_percent: Option<f64>,
    #[serde(default)]
    used_percent: Option<f64>,
    #[serde(default)]
    reset_time: Option<String>,
}

/// Parses the quota API's JSON body.
pub fn parse_quota_response(body: &str) -> Result<UsageSnapshot, ProbeError> {
    let response: QuotaResponse = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Quota response is not valid JSON");
        ProbeError::ParseFailed(format!("invalid quota JSON: {e}"))
    })?;

    let mut quotas = Vec::new();
    for bucket in response.buckets {
        let Some(model) = bucket.model else { continue };
        let remaining = match (bucket.remaining_percent, bucket.used_percent) {
            (Some(r), _) => r,
            (None, Some(u)) => 100.0 - u,
            (None, None) => continue,
        };
        let mut quota = UsageQuota::new(ProviderId::Gemini, QuotaKind::Model(model), remaining);
        if let Some(reset) = bucket.reset_time {
            if let Ok(at) = chrono::DateTime::parse_from_rfc3339(&reset) {
                quota = quota.with_resets_at(at.with_timezone(&chrono::Utc));
            } else {
                quota = quota.with_reset_text(reset);
            }
        }
        quotas.push(quota);
    }

    if quotas.is_empty() {
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Gemini, quotas);
    if let Some(email) = response.account_email {
        snapshot = snapshot.with_account(quotabar_core::AccountInfo {
            email: Some(email),
            ..Default::default()
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_screen_parses_model_meters() {
        let screen = "\
Daily usage (resets midnight UTC)

gemini-2.5-pro      12% used
gemini-2.5-flash     3% used

Signed in as: user@gmail.com";

        let snapshot = parse_stats_screen(screen).unwrap();
        assert_eq!(snapshot.quotas.len(), 2);

        let pro = snapshot
            .quota(&QuotaKind::Model("gemini-2.5-pro".into()))
            .unwrap();
        assert_eq!(pro.percent_remaining, 88.0);
        assert_eq!(pro.reset_text.as_deref(), Some("midnight UTC"));

        assert_eq!(
            snapshot.account.unwrap().email.as_deref(),
            Some("user@gmail.com")
        );
    }

    #[test]
    fn stats_screen_without_meters_is_no_data() {
        assert_eq!(
            parse_stats_screen("Gemini CLI\nno usage yet").unwrap_err(),
            ProbeError::NoData
        );
    }

    #[test]
    fn quota_response_parses_buckets() {
        let body = r#"{
            "buckets": [
                {"model": "gemini-2.5-pro", "remainingPercent": 88.0,
                 "resetTime": "2026-08-07T00:00:00Z"},
                {"model": "gemini-2.5-flash", "usedPercent": 3.0}
            ],
            "accountEmail": "user@gmail.com"
        }"#;

        let snapshot = parse_quota_response(body).unwrap();
        let pro = snapshot
            .quota(&QuotaKind::Model("gemini-2.5-pro".into()))
            .unwrap();
        assert_eq!(pro.percent_remaining, 88.0);
        assert!(pro.resets_at.is_some());

        let flash = snapshot
            .quota(&QuotaKind::Model("gemini-2.5-flash".into()))
            .unwrap();
        assert_eq!(flash.percent_remaining, 97.0);
    }

    #[test]
    fn malformed_quota_json_is_parse_failed() {
        assert!(matches!(
            parse_quota_response("<html>rate limited</html>").unwrap_err(),
            ProbeError::ParseFailed(_)
        ));
    }

    #[test]
    fn empty_buckets_is_no_data() {
        assert_eq!(
            parse_quota_response(r#"{"buckets": []}"#).unwrap_err(),
            ProbeError::NoData
        );
    }
}
