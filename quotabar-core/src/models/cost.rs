//! Cost ("extra usage") figures.
//!
//! Monetary values use decimal arithmetic end to end. Parsing a cost line
//! into binary floats and comparing against a budget produces rounding
//! artifacts near the limit, which is exactly where the comparison matters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Spent/budget cost figures attached to a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostUsage {
    /// Amount spent in the current billing window.
    pub spent: Decimal,
    /// Budget for the window, when the surface reports one.
    pub budget: Option<Decimal>,
    /// Accumulated API call duration in seconds, when reported.
    pub api_duration_secs: Option<f64>,
}

impl CostUsage {
    /// Creates a cost record with no budget.
    pub fn spent_only(spent: Decimal) -> Self {
        Self {
            spent,
            budget: None,
            api_duration_secs: None,
        }
    }

    /// Creates a cost record with a budget.
    pub fn new(spent: Decimal, budget: Decimal) -> Self {
        Self {
            spent,
            budget: Some(budget),
            api_duration_secs: None,
        }
    }

    /// Remaining budget, when a budget is known. Never negative.
    pub fn remaining(&self) -> Option<Decimal> {
        self.budget
            .map(|b| (b - self.spent).max(Decimal::ZERO))
    }

    /// Returns true if spend has reached or passed the budget.
    pub fn is_over_budget(&self) -> bool {
        self.budget.is_some_and(|b| self.spent >= b)
    }

    /// Accumulated API duration, when reported.
    pub fn api_duration(&self) -> Option<Duration> {
        self.api_duration_secs
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn remaining_is_exact() {
        let cost = CostUsage::new(d("5.41"), d("20.00"));
        assert_eq!(cost.remaining(), Some(d("14.59")));
        assert!(!cost.is_over_budget());
    }

    #[test]
    fn over_budget_clamps_remaining() {
        let cost = CostUsage::new(d("20.01"), d("20.00"));
        assert_eq!(cost.remaining(), Some(Decimal::ZERO));
        assert!(cost.is_over_budget());
    }

    #[test]
    fn exactly_at_budget_counts_as_over() {
        // 0.1 + 0.2 style cases are why this is decimal, not f64
        let cost = CostUsage::new(d("0.30"), d("0.30"));
        assert!(cost.is_over_budget());
    }

    #[test]
    fn api_duration_conversion() {
        let mut cost = CostUsage::spent_only(d("1.00"));
        cost.api_duration_secs = Some(90.5);
        assert_eq!(cost.api_duration(), Some(Duration::from_secs_f64(90.5)));

        cost.api_duration_secs = Some(f64::NAN);
        assert_eq!(cost.api_duration(), None);
    }
}
