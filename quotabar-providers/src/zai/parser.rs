//! Parser for Z.ai usage output.
//!
//! ```text
//! Z.ai Coding Plan
//!
//! 5-hour limit:   72% left (resets in 2h 10m)
//! Monthly limit:  45% left (resets Feb 1)
//!
//! Account: user@example.com
//! ```
//!
//! Each labeled limit becomes a named time-limit quota. Accounts on
//! API-metered billing get a subscription-only notice instead of meters,
//! which classifies before parsing.

use quotabar_core::{
    AccountInfo, ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot,
};

use crate::textscan;

/// Parses the rendered usage blocks.
pub fn parse_usage_blocks(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let mut quotas = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let Some(remaining) = textscan::percent_remaining(line) else {
            continue;
        };
        let Some(name) = limit_label(line) else {
            continue;
        };

        let mut quota =
            UsageQuota::new(ProviderId::Zai, QuotaKind::TimeLimit(name), remaining);
        if let Some(reset) = textscan::reset_text(line.trim_end_matches(')')) {
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

    let mut snapshot = UsageSnapshot::new(ProviderId::Zai, quotas);
    if let Some(email) = textscan::account_email(text) {
        snapshot = snapshot.with_account(AccountInfo {
            email: Some(email),
            ..Default::default()
        });
    }
    Ok(snapshot)
}

/// The window name is the text before the colon: `"5-hour limit"` -> `"5-hour"`.
fn limit_label(line: &str) -> Option<String> {
    let (label, _) = line.split_once(':')?;
    let label = label
        .trim()
        .trim_end_matches("limit")
        .trim_end_matches("Limit")
        .trim()
        .to_lowercase();
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

    const SCREEN: &str = "\
Z.ai Coding Plan

5-hour limit:   72% left (resets in 2h 10m)
Monthly limit:  45% left (resets Feb 1)

Account: user@example.com";

    #[test]
    fn parses_named_limits() {
        let snapshot = parse_usage_blocks(SCREEN).unwrap();
        assert_eq!(snapshot.quotas.len(), 2);

        let hourly = snapshot
            .quota(&QuotaKind::TimeLimit("5-hour".into()))
            .unwrap();
        assert_eq!(hourly.percent_remaining, 72.0);
        assert_eq!(hourly.reset_text.as_deref(), Some("in 2h 10m"));
        assert!(hourly.resets_at.is_some());

        let monthly = snapshot
            .quota(&QuotaKind::TimeLimit("monthly".into()))
            .unwrap();
        assert_eq!(monthly.percent_remaining, 45.0);
        // calendar reset: text retained, no absolute instant
        assert_eq!(monthly.reset_text.as_deref(), Some("Feb 1"));
        assert!(monthly.resets_at.is_none());
    }

    #[test]
    fn used_representation_is_normalized() {
        let screen = "5-hour limit: 28% used";
        let snapshot = parse_usage_blocks(screen).unwrap();
        assert_eq!(
            snapshot
                .quota(&QuotaKind::TimeLimit("5-hour".into()))
                .unwrap()
                .percent_remaining,
            72.0
        );
    }

    #[test]
    fn subscription_notice_classifies_first() {
        let screen = "Usage meters are only available for subscription plans.\nUpgrade at z.ai";
        assert!(matches!(
            parse_usage_blocks(screen).unwrap_err(),
            ProbeError::SubscriptionRequired(_)
        ));
    }

    #[test]
    fn meterless_output_is_no_data() {
        assert_eq!(
            parse_usage_blocks("Z.ai Coding Plan\nAll good").unwrap_err(),
            ProbeError::NoData
        );
    }
}
