//! Parser for the Antigravity quota table.
//!
//! The CLI prints one row per model:
//!
//! ```text
//! Model quotas
//!
//! Claude Sonnet 4.5        80% remaining   resets in 3h 15m
//! Gemini 3 Pro             45% remaining   resets in 3h 15m
//! Fast mode                 5% remaining   resets in 40m
//!
//! Account: user@example.com
//! ```
//!
//! Every quota here is model-scoped; there is no session/weekly split.

use quotabar_core::{
    AccountInfo, ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot,
};

use crate::textscan;

/// Parses the rendered quota table.
pub fn parse_quota_table(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let mut quotas = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let Some(remaining) = textscan::percent_remaining(line) else {
            continue;
        };
        let Some(model) = model_label(line) else {
            continue;
        };

        let mut quota = UsageQuota::new(ProviderId::Antigravity, QuotaKind::Model(model), remaining);
        if let Some(reset) = textscan::reset_text(line) {
            if let Some(at) = textscan::reset_instant(&reset, chrono::Utc::now()) {
                quota = quota.with_resets_at(at);
            }
            quota = quota.with_reset_text(reset);
        }
        quotas.push(quota);
    }

    if quotas.is_empty() {
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Antigravity, quotas);
    if let Some(email) = textscan::account_email(text) {
        snapshot = snapshot.with_account(AccountInfo {
            email: Some(email),
            ..Default::default()
        });
    }
    Ok(snapshot)
}

/// The model name is everything before the percentage column.
fn model_label(line: &str) -> Option<String> {
    let percent_pos = line.find('%')?;
    let before = &line[..percent_pos];
    let label: String = before
        .trim_end()
        .trim_end_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim()
        .to_string();
    // Header rows ("Model quotas") have no percent; meter rows with an
    // empty label are column markers, not quotas.
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
Model quotas

Claude Sonnet 4.5        80% remaining   resets in 3h 15m
Gemini 3 Pro             45% remaining   resets in 3h 15m
Fast mode                 5% remaining   resets in 40m

Account: user@example.com";

    #[test]
    fn parses_model_rows() {
        let snapshot = parse_quota_table(TABLE).unwrap();
        assert_eq!(snapshot.quotas.len(), 3);

        let sonnet = snapshot
            .quota(&QuotaKind::Model("Claude Sonnet 4.5".into()))
            .unwrap();
        assert_eq!(sonnet.percent_remaining, 80.0);
        assert_eq!(sonnet.reset_text.as_deref(), Some("in 3h 15m"));
        assert!(sonnet.resets_at.is_some());

        let fast = snapshot.quota(&QuotaKind::Model("Fast mode".into())).unwrap();
        assert_eq!(fast.percent_remaining, 5.0);
    }

    #[test]
    fn model_names_keep_version_suffixes() {
        // the trailing-digit trim eats the percent column only; the "4.5"
        // inside the name is protected by the column padding
        let line = "Claude Sonnet 4.5        80% remaining";
        assert_eq!(model_label(line).as_deref(), Some("Claude Sonnet 4.5"));
    }

    #[test]
    fn account_is_attached() {
        let snapshot = parse_quota_table(TABLE).unwrap();
        assert_eq!(
            snapshot.account.unwrap().email.as_deref(),
            Some("user@example.com")
        );
    }

    #[test]
    fn empty_table_is_no_data() {
        assert_eq!(
            parse_quota_table("Model quotas\n\nNo models available").unwrap_err(),
            ProbeError::NoData
        );
    }

    #[test]
    fn forbidden_banner_is_authentication() {
        let text = "Your session has expired. Sign in to continue.";
        assert!(matches!(
            parse_quota_table(text).unwrap_err(),
            ProbeError::AuthenticationRequired(_)
        ));
    }
}
