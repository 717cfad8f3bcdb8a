//! Revocation bridge: ordered listeners plus an async broadcast channel.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, error};

use sessionwatch_core::config::bridge::BridgeConfig;
use sessionwatch_core::events::RevocationEvent;
use sessionwatch_core::types::ListenerId;

use crate::audit;
use crate::listener::RevocationListener;
use crate::metrics::{BridgeMetrics, BridgeMetricsSnapshot};

type Registered = (ListenerId, Arc<dyn RevocationListener>);

/// Carries revocation events from detectors to consumers.
///
/// Listeners registered at emission time are each invoked exactly once, in
/// registration order, before [`emit`](Self::emit) returns. Async consumers
/// can instead hold a [`broadcast::Receiver`] from
/// [`subscribe_channel`](Self::subscribe_channel); it is fed after the
/// synchronous listeners ran.
pub struct RevocationBridge {
    /// Registered listeners, in registration order.
    listeners: RwLock<Vec<Registered>>,
    /// Fan-out for async subscribers.
    sender: broadcast::Sender<RevocationEvent>,
    /// Emission counters.
    metrics: BridgeMetrics,
}

impl std::fmt::Debug for RevocationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationBridge")
            .field("listeners", &self.listener_count())
            .field("channel_subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for RevocationBridge {
    fn default() -> Self {
        Self::new(&BridgeConfig::default())
    }
}

impl RevocationBridge {
    /// Create a bridge with the configured channel capacity.
    pub fn new(config: &BridgeConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            listeners: RwLock::new(Vec::new()),
            sender,
            metrics: BridgeMetrics::default(),
        }
    }

    /// Register a listener. It receives every event emitted from now on.
    pub fn subscribe(&self, listener: impl RevocationListener) -> ListenerId {
        let id = ListenerId::new();
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.push((id, Arc::new(listener)));
        debug!(listener_id = %id, total = listeners.len(), "Revocation listener registered");
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(listener_id = %id, "Revocation listener removed");
        }
        removed
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Receive events asynchronously.
    pub fn subscribe_channel(&self) -> broadcast::Receiver<RevocationEvent> {
        self.sender.subscribe()
    }

    /// Broadcast an event. Returns how many listeners were invoked.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe while being called; changes apply to the next emission.
    /// A panicking listener is logged and does not stop the others.
    pub fn emit(&self, event: RevocationEvent) -> usize {
        let snapshot: Vec<Registered> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        for (id, listener) in &snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| listener.on_revocation(&event)));
            if let Err(payload) = result {
                error!(
                    listener_id = %id,
                    event = event.name(),
                    panic = panic_message(payload.as_ref()),
                    "Revocation listener panicked"
                );
            }
        }

        let delivered = snapshot.len();
        self.metrics
            .record_emission(delivered, event.is_simulated());
        audit::log_emission(&event, delivered);

        // No async subscribers is not an error.
        let _ = self.sender.send(event);
        delivered
    }

    /// Number of events emitted so far.
    pub fn emitted_count(&self) -> u64 {
        self.metrics.events_emitted.load(Ordering::Relaxed)
    }

    /// Current emission counters.
    pub fn metrics(&self) -> BridgeMetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
