// Lint configuration for this crate
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! # `Quotabar` Monitor
//!
//! The refresh orchestrator: owns the provider collection, fans refreshes
//! out concurrently, isolates per-provider failures, detects
//! status-degradation transitions, and offers a cancellable continuous
//! polling mode.
//!
//! All orchestrator state lives behind one async mutex; readers receive
//! cloned [`ProviderView`]s, never references into shared mutable state.

mod events;
mod monitor;
mod provider;

pub use events::MonitorEvent;
pub use monitor::Monitor;
pub use provider::ProviderView;
