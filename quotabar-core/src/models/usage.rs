//! Usage quotas and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::cost::CostUsage;
use super::provider::{AccountInfo, ProviderId};
use super::status::QuotaStatus;

/// Age at which a snapshot is considered stale.
const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Quota Kind
// ============================================================================

/// The usage dimension a quota measures.
///
/// Within one snapshot each kind appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaKind {
    /// Rolling session window (e.g. 5 hours).
    Session,
    /// Weekly window.
    Weekly,
    /// Quota scoped to one model.
    Model(String),
    /// Named time-limited window (e.g. a monthly premium-request pool).
    TimeLimit(String),
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Weekly => write!(f, "weekly"),
            Self::Model(name) => write!(f, "model:{name}"),
            Self::TimeLimit(name) => write!(f, "limit:{name}"),
        }
    }
}

// ============================================================================
// Usage Quota
// ============================================================================

/// A single usage dimension with a remaining percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageQuota {
    /// Provider this quota belongs to.
    pub provider: ProviderId,
    /// The dimension being measured.
    pub kind: QuotaKind,
    /// Percentage of the quota still available, in `[0, 100]`.
    pub percent_remaining: f64,
    /// Absolute reset instant, when derivable from the source text.
    pub resets_at: Option<DateTime<Utc>>,
    /// Raw reset description, kept when no absolute instant is derivable.
    pub reset_text: Option<String>,
}

impl UsageQuota {
    /// Creates a quota from a remaining percentage.
    ///
    /// Non-finite input becomes `0.0`; finite input is clamped to `[0, 100]`
    /// so the invariant holds regardless of what a parser extracted.
    pub fn new(provider: ProviderId, kind: QuotaKind, percent_remaining: f64) -> Self {
        let percent_remaining = if percent_remaining.is_finite() {
            percent_remaining.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            provider,
            kind,
            percent_remaining,
            resets_at: None,
            reset_text: None,
        }
    }

    /// Creates a quota from a *used* percentage (`"X% used"` lines).
    pub fn from_used(provider: ProviderId, kind: QuotaKind, percent_used: f64) -> Self {
        let used = if percent_used.is_finite() {
            percent_used.clamp(0.0, 100.0)
        } else {
            100.0
        };
        Self::new(provider, kind, 100.0 - used)
    }

    /// Sets the absolute reset instant.
    pub fn with_resets_at(mut self, at: DateTime<Utc>) -> Self {
        self.resets_at = Some(at);
        self
    }

    /// Sets the descriptive reset text.
    pub fn with_reset_text(mut self, text: impl Into<String>) -> Self {
        self.reset_text = Some(text.into());
        self
    }

    /// Percentage of the quota consumed.
    pub fn percent_used(&self) -> f64 {
        100.0 - self.percent_remaining
    }

    /// Derived health classification.
    pub fn status(&self) -> QuotaStatus {
        QuotaStatus::from_percent_remaining(self.percent_remaining)
    }
}

// ============================================================================
// Usage Snapshot
// ============================================================================

/// Immutable set of quotas plus metadata captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Provider the snapshot belongs to.
    pub provider: ProviderId,
    /// Quotas, unique by kind.
    pub quotas: Vec<UsageQuota>,
    /// When the snapshot was captured.
    pub captured_at: DateTime<Utc>,
    /// Account metadata, when the source exposed it.
    pub account: Option<AccountInfo>,
    /// Cost figures, when the source exposed them.
    pub cost: Option<CostUsage>,
}

impl UsageSnapshot {
    /// Creates a snapshot, deduplicating quotas by kind (first wins --
    /// parsers scan top to bottom and the first occurrence is the canonical
    /// meter on every known screen).
    pub fn new(provider: ProviderId, quotas: Vec<UsageQuota>) -> Self {
        let mut seen: Vec<QuotaKind> = Vec::with_capacity(quotas.len());
        let quotas = quotas
            .into_iter()
            .filter(|q| {
                if seen.contains(&q.kind) {
                    false
                } else {
                    seen.push(q.kind.clone());
                    true
                }
            })
            .collect();
        Self {
            provider,
            quotas,
            captured_at: Utc::now(),
            account: None,
            cost: None,
        }
    }

    /// Attaches account metadata.
    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = Some(account);
        self
    }

    /// Attaches cost figures.
    pub fn with_cost(mut self, cost: CostUsage) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Worst status across all quotas. `Healthy` when no quotas are present.
    pub fn overall_status(&self) -> QuotaStatus {
        self.quotas
            .iter()
            .map(UsageQuota::status)
            .max()
            .unwrap_or_default()
    }

    /// Looks up a quota by kind.
    pub fn quota(&self, kind: &QuotaKind) -> Option<&UsageQuota> {
        self.quotas.iter().find(|q| &q.kind == kind)
    }

    /// Returns true if any quota is present.
    pub fn has_data(&self) -> bool {
        !self.quotas.is_empty()
    }

    /// Returns true if the snapshot is at least five minutes old.
    pub fn is_stale(&self) -> bool {
        self.age() >= STALE_AFTER
    }

    /// Snapshot age, saturating at zero for clock skew.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.captured_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn quota(kind: QuotaKind, remaining: f64) -> UsageQuota {
        UsageQuota::new(ProviderId::Claude, kind, remaining)
    }

    #[test]
    fn new_clamps_percent() {
        assert_eq!(quota(QuotaKind::Session, 120.0).percent_remaining, 100.0);
        assert_eq!(quota(QuotaKind::Session, -5.0).percent_remaining, 0.0);
        assert_eq!(quota(QuotaKind::Session, f64::NAN).percent_remaining, 0.0);
    }

    #[test]
    fn used_and_left_are_equivalent() {
        let from_used = UsageQuota::from_used(ProviderId::Claude, QuotaKind::Session, 25.0);
        let from_left = quota(QuotaKind::Session, 75.0);
        assert_eq!(from_used.percent_remaining, from_left.percent_remaining);
        assert_eq!(from_used.percent_remaining, 75.0);
    }

    #[test]
    fn snapshot_dedups_by_kind_first_wins() {
        let snapshot = UsageSnapshot::new(
            ProviderId::Claude,
            vec![
                quota(QuotaKind::Session, 80.0),
                quota(QuotaKind::Weekly, 60.0),
                quota(QuotaKind::Session, 10.0),
            ],
        );
        assert_eq!(snapshot.quotas.len(), 2);
        assert_eq!(
            snapshot.quota(&QuotaKind::Session).unwrap().percent_remaining,
            80.0
        );
    }

    #[test]
    fn overall_status_is_worst() {
        let snapshot = UsageSnapshot::new(
            ProviderId::Claude,
            vec![
                quota(QuotaKind::Session, 80.0),
                quota(QuotaKind::Weekly, 15.0),
                quota(QuotaKind::Model("Opus".into()), 40.0),
            ],
        );
        assert_eq!(snapshot.overall_status(), QuotaStatus::Critical);
    }

    #[test]
    fn empty_snapshot_is_healthy() {
        let snapshot = UsageSnapshot::new(ProviderId::Codex, vec![]);
        assert_eq!(snapshot.overall_status(), QuotaStatus::Healthy);
        assert!(!snapshot.has_data());
    }

    #[test]
    fn staleness_threshold() {
        let mut snapshot = UsageSnapshot::new(ProviderId::Codex, vec![]);
        assert!(!snapshot.is_stale());
        snapshot.captured_at = Utc::now() - ChronoDuration::minutes(6);
        assert!(snapshot.is_stale());
    }
}
