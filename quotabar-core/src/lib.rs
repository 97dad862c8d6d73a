// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Quotabar` Core
//!
//! Core types, models, and traits shared by every other `Quotabar` crate.
//!
//! This crate provides:
//!
//! - The typed usage model (quotas, snapshots, account metadata, cost)
//! - The derived health classification ([`QuotaStatus`])
//! - The closed probe error taxonomy ([`ProbeError`])
//! - The capability traits implemented per provider ([`Probe`]) and
//!   consumed by the refresh orchestrator ([`StatusObserver`])
//!
//! ## Key Types
//!
//! - [`ProviderId`] - Enum of all supported providers
//! - [`UsageQuota`] - A single usage dimension with a remaining percentage
//! - [`UsageSnapshot`] - Immutable set of quotas captured at one point in time
//! - [`QuotaStatus`] - Ordered health classification derived from remaining %
//! - [`AccountInfo`] - Account email, organization, tier, login method
//! - [`CostUsage`] - Spent/budget cost figures in decimal arithmetic

pub mod error;
pub mod models;
pub mod traits;

pub use error::ProbeError;

pub use models::{
    AccountInfo,
    AccountTier,
    CostUsage,
    LoginMethod,
    ProviderId,
    QuotaKind,
    QuotaStatus,
    UsageQuota,
    UsageSnapshot,
};

pub use traits::{NoopObserver, Probe, StatusObserver};
