//! Cloud-billing cost report parser.
//!
//! The billing API reports amounts as decimal strings (`"5.41"`), which is
//! what keeps the arithmetic exact: the values never pass through binary
//! floats. Older report revisions nest the same figures under `totals`;
//! both layouts are accepted.

use quotabar_core::{CostUsage, ProbeError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// Billing report body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingReport {
    #[serde(default)]
    spent: Option<String>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    api_duration_seconds: Option<f64>,
    /// Older report revision nests the figures.
    #[serde(default)]
    totals: Option<BillingTotals>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingTotals {
    #[serde(default)]
    spent: Option<String>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    api_duration_seconds: Option<f64>,
}

/// Parses a billing report body into cost figures.
pub fn parse_billing_report(body: &str) -> Result<CostUsage, ProbeError> {
    let report: BillingReport = serde_json::from_str(body)
        .map_err(|e| ProbeError::ParseFailed(format!("invalid billing JSON: {e}")))?;

    let (spent, budget, duration) = match report.totals {
        Some(totals) => (totals.spent, totals.budget, totals.api_duration_seconds),
        None => (report.spent, report.budget, report.api_duration_seconds),
    };

    let Some(spent) = spent else {
        debug!("Billing report carries no spend figure");
        return Err(ProbeError::NoData);
    };

    let spent = parse_amount(&spent)?;
    let budget = budget.as_deref().map(parse_amount).transpose()?;

    let mut cost = match budget {
        Some(budget) => CostUsage::new(spent, budget),
        None => CostUsage::spent_only(spent),
    };
    cost.api_duration_secs = duration.filter(|s| s.is_finite() && *s >= 0.0);
    Ok(cost)
}

fn parse_amount(raw: &str) -> Result<Decimal, ProbeError> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned)
        .map_err(|e| ProbeError::ParseFailed(format!("bad amount {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn flat_report_parses() {
        let body = r#"{"spent": "5.41", "budget": "20.00", "apiDurationSeconds": 321.5}"#;
        let cost = parse_billing_report(body).unwrap();
        assert_eq!(cost.spent, d("5.41"));
        assert_eq!(cost.budget, Some(d("20.00")));
        assert_eq!(cost.api_duration_secs, Some(321.5));
    }

    #[test]
    fn nested_totals_parse() {
        let body = r#"{"totals": {"spent": "1,234.56", "budget": "5,000"}}"#;
        let cost = parse_billing_report(body).unwrap();
        assert_eq!(cost.spent, d("1234.56"));
        assert_eq!(cost.budget, Some(d("5000")));
    }

    #[test]
    fn spend_without_budget() {
        let cost = parse_billing_report(r#"{"spent": "$3.50"}"#).unwrap();
        assert_eq!(cost.spent, d("3.50"));
        assert_eq!(cost.budget, None);
    }

    #[test]
    fn missing_spend_is_no_data() {
        assert_eq!(
            parse_billing_report(r#"{"budget": "20.00"}"#).unwrap_err(),
            ProbeError::NoData
        );
    }

    #[test]
    fn malformed_body_is_parse_failed() {
        assert!(matches!(
            parse_billing_report("not json").unwrap_err(),
            ProbeError::ParseFailed(_)
        ));
        assert!(matches!(
            parse_billing_report(r#"{"spent": "lots"}"#).unwrap_err(),
            ProbeError::ParseFailed(_)
        ));
    }

    #[test]
    fn decimal_precision_survives() {
        // 0.1 + 0.2 == 0.3 exactly in decimal; the parse must not detour
        // through f64
        let body = r#"{"spent": "0.1", "budget": "0.3"}"#;
        let cost = parse_billing_report(body).unwrap();
        assert_eq!(cost.remaining(), Some(d("0.2")));
    }
}
