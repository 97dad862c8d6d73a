//! Parser for `gh copilot quota` output.
//!
//! `gh` behaves with piped output, so the input here is plain text rather
//! than a rendered screen:
//!
//! ```text
//! Copilot quota
//!
//! Premium requests: 63% remaining (resets Feb 1)
//! Chat: unlimited
//! Plan: Copilot Pro
//!
//! Logged in as octocat
//! ```

use quotabar_core::{
    AccountInfo, AccountTier, ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot,
};
use regex::Regex;
use std::sync::LazyLock;

use crate::textscan;

/// `"Logged in as octocat"` -- gh reports a login, not an email.
static LOGIN_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)logged in (?:to [^\s]+ )?as\s+([A-Za-z0-9-]+)").expect("invalid regex")
});

/// Parses the quota output.
pub fn parse_quota_output(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let mut quotas = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();
        if !lower.starts_with("premium requests") {
            continue;
        }
        let Some(remaining) = textscan::percent_remaining(line) else {
            continue;
        };
        let mut quota = UsageQuota::new(
            ProviderId::Copilot,
            QuotaKind::TimeLimit("premium-requests".to_string()),
            remaining,
        );
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

    let mut snapshot = UsageSnapshot::new(ProviderId::Copilot, quotas);

    let tier = text
        .lines()
        .find(|line| line.trim().to_lowercase().starts_with("plan:"))
        .and_then(|line| AccountTier::from_marker(line));
    let login = LOGIN_NAME_RE
        .captures(text)
        .map(|caps| caps[1].to_string());

    if tier.is_some() || login.is_some() {
        snapshot = snapshot.with_account(AccountInfo {
            email: login,
            organization: None,
            tier,
            login_method: None,
        });
    }
    Ok(snapshot)
}
