//! The refresh orchestrator.

use futures::future::join_all;
use quotabar_core::{NoopObserver, Probe, ProviderId, QuotaStatus, StatusObserver};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::events::MonitorEvent;
use crate::provider::{ProviderState, ProviderView};

/// Capacity of the monitoring event channel. Ticks are coarse; a slow
/// consumer applies backpressure to the loop rather than dropping events.
const EVENT_CHANNEL_CAPACITY: usize = 8;

// ============================================================================
// Monitor
// ============================================================================

/// Owns the provider collection and orchestrates concurrent refreshes.
///
/// All mutable state sits behind one async mutex, held only between probe
/// runs -- probes themselves execute outside the lock so the fan-out is
/// genuinely concurrent. Cloning the monitor shares the same state.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    observer: Arc<dyn StatusObserver>,
}

struct State {
    providers: Vec<ProviderState>,
    /// Last recorded overall status per provider, for transition detection.
    previous_status: HashMap<ProviderId, QuotaStatus>,
    /// Handle of the continuous polling loop while monitoring.
    monitor_task: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Creates a monitor over the given probes with no observer.
    pub fn new(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self::with_observer(probes, Arc::new(NoopObserver))
    }

    /// Creates a monitor that reports status transitions to `observer`.
    pub fn with_observer(probes: Vec<Arc<dyn Probe>>, observer: Arc<dyn StatusObserver>) -> Self {
        let providers = probes.into_iter().map(ProviderState::new).collect();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    providers,
                    previous_status: HashMap::new(),
                    monitor_task: None,
                }),
                observer,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Refresh operations
    // ------------------------------------------------------------------

    /// Refreshes every provider concurrently.
    ///
    /// Failures stay on their provider; none aborts the fan-out or
    /// escapes this call. Wall-clock time approximates the slowest single
    /// probe, not the sum.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) {
        self.refresh_filtered(|_| true).await;
    }

    /// Refreshes a single provider.
    #[instrument(skip(self))]
    pub async fn refresh(&self, id: ProviderId) {
        self.refresh_filtered(|p| p == id).await;
    }

    /// Refreshes every provider except `except`.
    #[instrument(skip(self))]
    pub async fn refresh_others(&self, except: ProviderId) {
        self.refresh_filtered(|p| p != except).await;
    }

    async fn refresh_filtered<F>(&self, filter: F)
    where
        F: Fn(ProviderId) -> bool,
    {
        // Phase 1: under the lock, mark matching providers as syncing and
        // clone out their probes.
        let targets: Vec<(ProviderId, Arc<dyn Probe>)> = {
            let mut state = self.inner.state.lock().await;
            let mut targets = Vec::new();
            for provider in &mut state.providers {
                let id = provider.id();
                if !filter(id) {
                    continue;
                }
                if !provider.probe.is_available() {
                    // Not installed is a no-op, not an error.
                    debug!(provider = %id, "Probe unavailable, skipping");
                    continue;
                }
                provider.syncing = true;
                targets.push((id, provider.probe.clone()));
            }
            targets
        };

        if targets.is_empty() {
            return;
        }

        // Phase 2: run all probes outside the lock, concurrently. Each
        // future resolves to its provider's classified outcome.
        let outcomes = join_all(targets.into_iter().map(|(id, probe)| async move {
            let result = probe.probe().await;
            (id, result)
        }))
        .await;

        // Phase 3: apply outcomes and collect transitions under the lock.
        let mut transitions: Vec<(ProviderId, QuotaStatus, QuotaStatus)> = Vec::new();
        {
            let mut state = self.inner.state.lock().await;
            for (id, result) in outcomes {
                let Some(provider) = state.providers.iter_mut().find(|p| p.id() == id) else {
                    continue;
                };
                provider.syncing = false;

                match result {
                    Ok(snapshot) => {
                        let new_status = snapshot.overall_status();
                        debug!(provider = %id, status = %new_status, "Refresh succeeded");
                        provider.snapshot = Some(snapshot);
                        provider.last_error = None;

                        match state.previous_status.get(&id).copied() {
                            Some(old) if old != new_status => {
                                transitions.push((id, old, new_status));
                                state.previous_status.insert(id, new_status);
                            }
                            Some(_) => {}
                            None => {
                                // First observation: record it, a transition
                                // needs two observed states.
                                state.previous_status.insert(id, new_status);
                            }
                        }
                    }
                    Err(error) => {
                        warn!(provider = %id, error = %error, "Refresh failed");
                        provider.last_error = Some(error);
                        // Stale snapshot, if any, is retained.
                    }
                }
            }
        }

        // Phase 4: notify outside the lock so an observer can re-enter the
        // monitor without deadlocking.
        for (id, old, new) in transitions {
            info!(provider = %id, old = %old, new = %new, "Status transition");
            self.inner.observer.on_status_changed(id, old, new);
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Returns snapshot-consistent views of every provider.
    pub async fn views(&self) -> Vec<ProviderView> {
        let state = self.inner.state.lock().await;
        state.providers.iter().map(ProviderState::view).collect()
    }

    /// Returns the view of one provider.
    pub async fn view(&self, id: ProviderId) -> Option<ProviderView> {
        let state = self.inner.state.lock().await;
        state
            .providers
            .iter()
            .find(|p| p.id() == id)
            .map(ProviderState::view)
    }

    // ------------------------------------------------------------------
    // Continuous monitoring
    // ------------------------------------------------------------------

    /// Starts continuous polling, returning the event stream.
    ///
    /// Each tick runs `refresh_all` and emits one
    /// [`MonitorEvent::Refreshed`]. Starting while already monitoring
    /// cancels the previous loop first, so a second start is safe. The
    /// stream ends shortly after [`stop_monitoring`](Self::stop_monitoring).
    pub async fn start_monitoring(&self, interval: Duration) -> mpsc::Receiver<MonitorEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.monitor_task.take() {
            debug!("Cancelling previous monitoring loop");
            task.abort();
        }

        let monitor = self.clone();
        let handle = tokio::spawn(async move {
            info!(interval = ?interval, "Monitoring started");
            let mut cycle = 0u64;
            loop {
                monitor.refresh_all().await;
                cycle += 1;
                if tx.send(MonitorEvent::Refreshed { cycle }).await.is_err() {
                    debug!("Event receiver dropped, monitoring loop ends");
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });
        state.monitor_task = Some(handle);

        rx
    }

    /// Stops continuous polling.
    ///
    /// The loop task is aborted: the sleep between cycles cancels
    /// immediately and in-flight async work cancels at its next await
    /// point. PTY work already handed to a blocking thread runs to
    /// completion in the background with its result discarded; the runner
    /// closes its handles on every path, so nothing leaks.
    pub async fn stop_monitoring(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(task) = state.monitor_task.take() {
            info!("Monitoring stopped");
            task.abort();
        }
    }

    /// Returns true while the polling loop is active.
    pub async fn is_monitoring(&self) -> bool {
        let state = self.inner.state.lock().await;
        state
            .monitor_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

// ============================================================================
// Tests
// ============================================================================
