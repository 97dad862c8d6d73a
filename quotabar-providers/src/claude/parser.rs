//! Parser for the Claude `/usage` screen.
//!
//! Rendered output looks like:
//!
//! ```text
//! Claude Max
//!
//! Current session
//! ████████████████████░░░░░░░░  72% left
//! Resets 2pm (America/Chicago)
//!
//! Current week (all models)
//! ██████████░░░░░░░░░░░░░░░░░░  45% left
//! Resets Jan 5 at 12am
//!
//! Current week (Opus)
//! ████████████████████████░░░░  80% left
//!
//! Extra usage: $5.41 / $20.00 spent
//!
//! Account: user@example.com
//! Org: Acme Inc
//! Login method: OAuth
//! ```
//!
//! Meter sections are keyed by their header line; the percent line sits on
//! or below the header, with the reset line after it.

use quotabar_core::{
    AccountInfo, AccountTier, CostUsage, ProbeError, ProviderId, QuotaKind, UsageQuota,
    UsageSnapshot,
};
use tracing::debug;

use crate::textscan;

/// Parses the rendered `/usage` screen into a snapshot.
pub fn parse_usage_screen(text: &str) -> Result<UsageSnapshot, ProbeError> {
    if let Some(banner) = textscan::detect_failure_banner(text) {
        return Err(banner);
    }

    let mut quotas = Vec::new();
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let header = lines[i].trim();
        if let Some(kind) = section_kind(header) {
            // The percent may share the header line or sit within the next
            // two lines (bar row, then percent row on narrow layouts).
            let mut percent = textscan::percent_remaining(header);
            let mut consumed = 0;
            for offset in 1..=2 {
                if percent.is_some() {
                    break;
                }
                if let Some(line) = lines.get(i + offset) {
                    percent = textscan::percent_remaining(line);
                    consumed = offset;
                }
            }

            if let Some(remaining) = percent {
                let mut quota = UsageQuota::new(ProviderId::Claude, kind, remaining);
                // Reset info follows the meter, before the next blank line.
                let mut j = i + consumed + 1;
                while let Some(line) = lines.get(j) {
                    let line = line.trim();
                    if line.is_empty() || section_kind(line).is_some() {
                        break;
                    }
                    if let Some(text) = textscan::reset_text(line) {
                        if let Some(at) = textscan::reset_instant(&text, quota_now()) {
                            quota = quota.with_resets_at(at);
                        }
                        quota = quota.with_reset_text(text);
                        break;
                    }
                    j += 1;
                }
                quotas.push(quota);
                i += consumed;
            }
        }
        i += 1;
    }

    if quotas.is_empty() {
        debug!("No usage meters found in /usage output");
        return Err(ProbeError::NoData);
    }

    let mut snapshot = UsageSnapshot::new(ProviderId::Claude, quotas);

    if let Some(cost) = extra_usage(text) {
        snapshot = snapshot.with_cost(cost);
    }

    let tier = textscan::tier_from_header(text).unwrap_or_else(AccountTier::assumed);
    let account = AccountInfo {
        email: textscan::account_email(text),
        organization: textscan::organization(text),
        tier: Some(tier),
        login_method: textscan::login_method(text),
    };
    snapshot = snapshot.with_account(account);

    Ok(snapshot)
}

fn quota_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

/// Maps a section header to its quota kind.
fn section_kind(line: &str) -> Option<QuotaKind> {
    let lower = line.to_lowercase();
    if !lower.starts_with("current") {
        return None;
    }
    if lower.contains("session") {
        return Some(QuotaKind::Session);
    }
    if lower.contains("week") {
        if lower.contains("all models") || !lower.contains('(') {
            return Some(QuotaKind::Weekly);
        }
        // "Current week (Opus)" -- model-scoped weekly meter.
        let name = line
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(name, _)| name.trim().to_string())?;
        return Some(QuotaKind::Model(name));
    }
    None
}

/// Parses the `"Extra usage: $a / $b spent"` line.
fn extra_usage(text: &str) -> Option<CostUsage> {
    let line = text
        .lines()
        .find(|line| line.to_lowercase().contains("extra usage"))?;
    let (spent, budget) = textscan::money_pair(line)?;
    Some(match budget {
        Some(budget) => CostUsage::new(spent, budget),
        None => CostUsage::spent_only(spent),
    })
}
