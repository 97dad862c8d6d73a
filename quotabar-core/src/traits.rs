//! Capability traits at the core boundary.
//!
//! A [`Probe`] fetches and parses raw usage data for one provider. The
//! refresh orchestrator consumes probes through this trait only, so a new
//! provider registers a probe without the orchestrator changing.

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::models::{ProviderId, QuotaStatus, UsageSnapshot};

/// Fetches and parses usage data for one provider.
///
/// Implementations wrap whatever transport the provider needs (PTY capture,
/// JSON-RPC over stdio, HTTP) and must classify every failure into a
/// [`ProbeError`] before returning.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The provider this probe serves.
    fn provider(&self) -> ProviderId;

    /// Returns true if the probe's prerequisites are installed.
    ///
    /// This must be a quick local check (binary on PATH, credential file
    /// present) -- never a network round-trip. An unavailable probe is
    /// skipped by the orchestrator, which is not an error.
    fn is_available(&self) -> bool;

    /// Fetches a fresh usage snapshot.
    async fn probe(&self) -> Result<UsageSnapshot, ProbeError>;
}

/// Receives status-transition notifications from the orchestrator.
///
/// Invoked only on an actual transition, never on repeated identical
/// status. The excluded alerting layer implements this.
pub trait StatusObserver: Send + Sync {
    /// Called when a provider's overall status changes between two
    /// successful refreshes.
    fn on_status_changed(&self, provider: ProviderId, old: QuotaStatus, new: QuotaStatus);
}

/// Observer that ignores all transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StatusObserver for NoopObserver {
    fn on_status_changed(&self, _provider: ProviderId, _old: QuotaStatus, _new: QuotaStatus) {}
}
