//! Bridge emission counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated on every emission.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Events emitted.
    pub events_emitted: AtomicU64,
    /// Listener invocations across all events.
    pub listener_deliveries: AtomicU64,
    /// Events that came from the simulation harness.
    pub simulated_events: AtomicU64,
}

/// Point-in-time copy of [`BridgeMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeMetricsSnapshot {
    /// Events emitted.
    pub events_emitted: u64,
    /// Listener invocations across all events.
    pub listener_deliveries: u64,
    /// Events that came from the simulation harness.
    pub simulated_events: u64,
}

impl BridgeMetrics {
    /// Record one emission reaching `delivered` listeners.
    pub fn record_emission(&self, delivered: usize, simulated: bool) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        self.listener_deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
        if simulated {
            self.simulated_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take a snapshot.
    pub fn snapshot(&self) -> BridgeMetricsSnapshot {
        BridgeMetricsSnapshot {
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            listener_deliveries: self.listener_deliveries.load(Ordering::Relaxed),
            simulated_events: self.simulated_events.load(Ordering::Relaxed),
        }
    }
}
