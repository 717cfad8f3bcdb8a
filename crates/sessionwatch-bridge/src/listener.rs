//! Listener abstraction for revocation events.

use sessionwatch_core::events::RevocationEvent;

/// Receives every revocation emitted on the bridge.
///
/// Called synchronously from [`RevocationBridge::emit`](crate::RevocationBridge::emit),
/// so implementations must not block.
pub trait RevocationListener: Send + Sync + 'static {
    /// Handle one revocation.
    fn on_revocation(&self, event: &RevocationEvent);
}

impl<F> RevocationListener for F
where
    F: Fn(&RevocationEvent) + Send + Sync + 'static,
{
    fn on_revocation(&self, event: &RevocationEvent) {
        self(event)
    }
}
