//! Integration tests for snapshot serialization and invariants.

use pretty_assertions::assert_eq;
use quotabar_core::{
    AccountInfo, AccountTier, CostUsage, LoginMethod, ProviderId, QuotaKind, QuotaStatus,
    UsageQuota, UsageSnapshot,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn full_snapshot() -> UsageSnapshot {
    let session = UsageQuota::new(ProviderId::Claude, QuotaKind::Session, 72.0)
        .with_reset_text("2pm (America/Chicago)");
    let weekly = UsageQuota::new(ProviderId::Claude, QuotaKind::Weekly, 45.0)
        .with_reset_text("Jan 5 at 12am");
    let opus = UsageQuota::new(
        ProviderId::Claude,
        QuotaKind::Model("Opus".to_string()),
        80.0,
    );

    UsageSnapshot::new(ProviderId::Claude, vec![session, weekly, opus])
        .with_account(AccountInfo {
            email: Some("user@example.com".to_string()),
            organization: Some("Acme Inc".to_string()),
            tier: Some(AccountTier::Max),
            login_method: Some(LoginMethod::OAuth),
        })
        .with_cost(CostUsage::new(
            Decimal::from_str("5.41").unwrap(),
            Decimal::from_str("20.00").unwrap(),
        ))
}

#[test]
fn snapshot_round_trips_through_json() {
    let snapshot = full_snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: UsageSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn json_uses_snake_case_identifiers() {
    let snapshot = full_snapshot();
    let value: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["provider"], "claude");
    assert_eq!(value["quotas"][0]["kind"], "session");
    assert_eq!(value["account"]["tier"], "max");
    assert_eq!(value["account"]["login_method"], "o_auth");
}

#[test]
fn cost_survives_decimal_round_trip() {
    let snapshot = full_snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: UsageSnapshot = serde_json::from_str(&json).unwrap();

    let cost = back.cost.unwrap();
    assert_eq!(cost.spent, Decimal::from_str("5.41").unwrap());
    assert_eq!(cost.remaining(), Some(Decimal::from_str("14.59").unwrap()));
}

#[test]
fn overall_status_reflects_worst_quota() {
    let mut snapshot = full_snapshot();
    assert_eq!(snapshot.overall_status(), QuotaStatus::Warning);

    snapshot.quotas.push(UsageQuota::new(
        ProviderId::Claude,
        QuotaKind::TimeLimit("burst".to_string()),
        0.0,
    ));
    assert_eq!(snapshot.overall_status(), QuotaStatus::Depleted);
}
