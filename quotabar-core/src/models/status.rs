//! Derived quota health classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health classification derived from a quota's remaining percentage.
///
/// The ordering is severity: `Healthy < Warning < Critical < Depleted`, so
/// the worst status across a snapshot is simply the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum QuotaStatus {
    /// More than half the quota remains.
    #[default]
    Healthy,
    /// Between 20% and 50% remains.
    Warning,
    /// Less than 20% remains.
    Critical,
    /// Nothing remains.
    Depleted,
}

impl QuotaStatus {
    /// Derives the status from a remaining percentage.
    ///
    /// Boundary rules: `0 -> Depleted`, `(0, 20) -> Critical`,
    /// `[20, 50] -> Warning`, `(50, 100] -> Healthy`.
    pub fn from_percent_remaining(remaining: f64) -> Self {
        if remaining <= 0.0 {
            Self::Depleted
        } else if remaining < 20.0 {
            Self::Critical
        } else if remaining <= 50.0 {
            Self::Warning
        } else {
            Self::Healthy
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Depleted => "depleted",
        }
    }
}

impl fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_deterministic() {
        assert_eq!(QuotaStatus::from_percent_remaining(65.0), QuotaStatus::Healthy);
        assert_eq!(QuotaStatus::from_percent_remaining(35.0), QuotaStatus::Warning);
        assert_eq!(QuotaStatus::from_percent_remaining(15.0), QuotaStatus::Critical);
        assert_eq!(QuotaStatus::from_percent_remaining(0.0), QuotaStatus::Depleted);
    }

    #[test]
    fn boundaries() {
        // 50 is still warning, just above is healthy
        assert_eq!(QuotaStatus::from_percent_remaining(50.0), QuotaStatus::Warning);
        assert_eq!(QuotaStatus::from_percent_remaining(50.01), QuotaStatus::Healthy);
        // 20 is warning, just below is critical
        assert_eq!(QuotaStatus::from_percent_remaining(20.0), QuotaStatus::Warning);
        assert_eq!(QuotaStatus::from_percent_remaining(19.99), QuotaStatus::Critical);
        // only exactly zero (or below) is depleted
        assert_eq!(QuotaStatus::from_percent_remaining(0.01), QuotaStatus::Critical);
        assert_eq!(QuotaStatus::from_percent_remaining(100.0), QuotaStatus::Healthy);
    }

    #[test]
    fn severity_ordering() {
        assert!(QuotaStatus::Healthy < QuotaStatus::Warning);
        assert!(QuotaStatus::Warning < QuotaStatus::Critical);
        assert!(QuotaStatus::Critical < QuotaStatus::Depleted);
        assert_eq!(
            QuotaStatus::Warning.max(QuotaStatus::Depleted),
            QuotaStatus::Depleted
        );
    }
}
