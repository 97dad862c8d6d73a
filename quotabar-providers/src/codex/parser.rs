//! Parsers for Codex quota surfaces.
//!
//! Two inputs produce the same snapshot shape: the structured rate-limit
//! payload from the app-server, and the rendered `/status` screen captured
//! over a PTY when RPC is unavailable.

use chrono::{DateTime, Utc};
use quotabar_core::{
    AccountInfo, AccountTier, ProbeError, ProviderId, QuotaKind, UsageQuota, UsageSnapshot,
};

use super::rpc::{AccountResult, RateLimits};
use crate::textscan;

// ============================================================================
// RPC payload
// ============================================================================

/// Converts an app-server rate-limit payload into a snapshot.
pub fn snapshot_from_rate_limits(
    limits: RateLimits,
    account: AccountResult,
) -> Result<UsageSnapshot, ProbeError> {
    let mut quotas = Vec::new();

    if let Some(window) = limits.primary {
        let mut quota =
            UsageQuota::from_used(ProviderId::Codex, QuotaKind::Session, window.used_percent);
        if let Some(at) = unix_to_utc(window.resets_at) {
            quota = quota.with_resets_at(at);
        }
        quotas.push(quota);
    }
    if let Some(window) = limits.secondary {
        let mut quota =
            UsageQuota::from_used(ProviderId::Codex, QuotaKind::Weekly, window.used_percent);
        if let Some(at) = unix_to_utc(window.resets_at) {
            quota = quota.with_resets_at(at);
        }
        quotas.push(quota);
    }

    if quotas.is_empty() {
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Codex, quotas);
    let info = AccountInfo {
        email: account.email,
        organization: account.organization,
        tier: account.plan.as_deref().and_then(AccountTier::from_marker),
        login_method: None,
    };
    if !info.is_empty() {
        snapshot = snapshot.with_account(info);
    }
    Ok(snapshot)
}

fn unix_to_utc(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

// ============================================================================
// /status screen
// ============================================================================

/// Parses the rendered `/status` screen.
///
/// ```text
/// Usage limits
/// 5h limit:     [█████░░░] 28% used (resets 14:30)
/// Weekly limit: [███░░░░░] 59% used (resets Mon 00:00)
///
/// Account: user@example.com (Pro)
/// ```
pub fn parse_status_screen(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let mut quotas = Vec::new();
    for line in text.lines() {
        let lower = line.to_lowercase();
        let kind = if lower.contains("5h") || lower.contains("session") {
            QuotaKind::Session
        } else if lower.contains("week") {
            QuotaKind::Weekly
        } else {
            continue;
        };

        let Some(remaining) = textscan::percent_remaining(line) else {
            continue;
        };
        let mut quota = UsageQuota::new(ProviderId::Codex, kind, remaining);
        if let Some(reset) = textscan::reset_text(line.trim_end_matches(')')) {
            if let Some(at) = textscan::reset_instant(&reset, Utc::now()) {
                quota = quota.with_resets_at(at);
            }
            quota = quota.with_reset_text(reset);
        }
        quotas.push(quota);
    }

    if quotas.is_empty() {
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Codex, quotas);
    let info = AccountInfo {
        email: textscan::account_email(text),
        organization: textscan::organization(text),
        tier: textscan::tier_from_header(text),
        login_method: textscan::login_method(text),
    };
    if !info.is_empty() {
        snapshot = snapshot.with_account(info);
    }
    Ok(snapshot)
}
