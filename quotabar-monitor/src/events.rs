//! Events emitted by the monitoring loop.

/// Event delivered on the monitoring channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// One full refresh cycle completed.
    Refreshed {
        /// Monotonic cycle counter, starting at 1.
        cycle: u64,
    },
}
