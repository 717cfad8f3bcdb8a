//! Callback seams for poller state transitions.

use std::sync::Arc;

use sessionwatch_bridge::RevocationBridge;
use sessionwatch_core::events::RevocationEvent;
use sessionwatch_core::types::{RevokedSession, SessionInfo};

/// Receives the poller's state transitions.
///
/// Callbacks run on the tokio task that performed the check and must not
/// block.
pub trait SessionObserver: Send + Sync + 'static {
    /// The backend reported the watched session as revoked.
    fn on_session_revoked(&self, session: RevokedSession);

    /// The backend returned the current session record.
    fn on_session_updated(&self, session: SessionInfo);
}

/// Observer built from two closures.
pub struct FnObserver<R, U> {
    on_revoked: R,
    on_updated: U,
}

impl<R, U> FnObserver<R, U>
where
    R: Fn(RevokedSession) + Send + Sync + 'static,
    U: Fn(SessionInfo) + Send + Sync + 'static,
{
    /// Wrap the two callbacks.
    pub fn new(on_revoked: R, on_updated: U) -> Self {
        Self {
            on_revoked,
            on_updated,
        }
    }
}

impl<R, U> SessionObserver for FnObserver<R, U>
where
    R: Fn(RevokedSession) + Send + Sync + 'static,
    U: Fn(SessionInfo) + Send + Sync + 'static,
{
    fn on_session_revoked(&self, session: RevokedSession) {
        (self.on_revoked)(session)
    }

    fn on_session_updated(&self, session: SessionInfo) {
        (self.on_updated)(session)
    }
}

/// Forwards detected revocations onto a [`RevocationBridge`].
///
/// Updates are logged and otherwise dropped.
#[derive(Debug, Clone)]
pub struct BridgeObserver {
    bridge: Arc<RevocationBridge>,
}

impl BridgeObserver {
    /// Forward to `bridge`.
    pub fn new(bridge: Arc<RevocationBridge>) -> Self {
        Self { bridge }
    }
}

impl SessionObserver for BridgeObserver {
    fn on_session_revoked(&self, session: RevokedSession) {
        tracing::warn!(
            uid = %session.uid,
            reason = %session.reason,
            replaced_by = ?session.replaced_by,
            "Session revoked by backend"
        );
        self.bridge.emit(RevocationEvent::detected(session));
    }

    fn on_session_updated(&self, session: SessionInfo) {
        tracing::debug!(
            uid = ?session.uid,
            status = ?session.status,
            last_activity = ?session.last_activity,
            "Session status refreshed"
        );
    }
}
