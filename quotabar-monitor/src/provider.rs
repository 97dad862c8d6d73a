//! Per-provider state held by the monitor.

use quotabar_core::{Probe, ProbeError, ProviderId, QuotaStatus, UsageSnapshot};
use std::sync::Arc;

/// Stateful holder of a provider's latest snapshot and error.
///
/// Lifecycle: created at startup with its probe; the snapshot is replaced
/// only by a successful refresh, the error on every attempt; never removed
/// during the process lifetime. No history is kept.
pub(crate) struct ProviderState {
    pub(crate) probe: Arc<dyn Probe>,
    pub(crate) snapshot: Option<UsageSnapshot>,
    pub(crate) last_error: Option<ProbeError>,
    pub(crate) syncing: bool,
}

impl ProviderState {
    pub(crate) fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            probe,
            snapshot: None,
            last_error: None,
            syncing: false,
        }
    }

    pub(crate) fn id(&self) -> ProviderId {
        self.probe.provider()
    }

    pub(crate) fn view(&self) -> ProviderView {
        ProviderView {
            id: self.id(),
            available: self.probe.is_available(),
            snapshot: self.snapshot.clone(),
            last_error: self.last_error.clone(),
            syncing: self.syncing,
        }
    }
}

/// Snapshot-consistent read of one provider's state.
///
/// Views are cloned out from under the monitor's lock, so a reader never
/// observes a partial update.
#[derive(Debug, Clone)]
pub struct ProviderView {
    /// Provider identifier.
    pub id: ProviderId,
    /// Whether the probe's prerequisites are installed.
    pub available: bool,
    /// Latest successful snapshot, if any.
    pub snapshot: Option<UsageSnapshot>,
    /// Error from the most recent failed attempt, if any.
    pub last_error: Option<ProbeError>,
    /// Whether a refresh is currently in flight.
    pub syncing: bool,
}

impl ProviderView {
    /// Overall status of the current snapshot, when one exists.
    pub fn status(&self) -> Option<QuotaStatus> {
        self.snapshot.as_ref().map(UsageSnapshot::overall_status)
    }
}
