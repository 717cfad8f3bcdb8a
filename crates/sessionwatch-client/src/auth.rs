//! Auth context the poller follows.
//!
//! The authenticated user is published on a `watch` channel; the poller
//! activates while a uid is present and stops when it becomes absent.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::poller::SessionPoller;

/// Publishes the currently authenticated user.
#[derive(Debug, Clone)]
pub struct AuthContext {
    tx: watch::Sender<Option<String>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    /// Create a context with nobody logged in.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Mark `uid` as authenticated.
    pub fn login(&self, uid: impl Into<String>) {
        let uid = uid.into();
        debug!(uid = %uid, "Auth context: login");
        self.tx.send_replace(Some(uid));
    }

    /// Clear the authenticated user.
    pub fn logout(&self) {
        debug!("Auth context: logout");
        self.tx.send_replace(None);
    }

    /// The authenticated user, if any.
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Receive user changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

/// Drive `poller` from an auth context until `shutdown` fires or the
/// context is dropped. The poller is stopped on return.
pub async fn follow_auth_context(
    poller: Arc<SessionPoller>,
    mut auth: watch::Receiver<Option<String>>,
    shutdown: CancellationToken,
) {
    let initial = auth.borrow_and_update().clone();
    poller.set_user(initial);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = auth.changed() => {
                if changed.is_err() {
                    debug!("Auth context closed");
                    break;
                }
                let uid = auth.borrow_and_update().clone();
                poller.set_user(uid);
            }
        }
    }

    poller.stop();
    info!("Stopped following auth context");
}

/// Spawn [`follow_auth_context`] on the current runtime.
pub fn spawn_follower(
    poller: Arc<SessionPoller>,
    auth: watch::Receiver<Option<String>>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(follow_auth_context(poller, auth, shutdown))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::observer::FnObserver;
    use crate::transport::{StatusResponse, StatusTransport};
    use sessionwatch_core::result::AppResult;

    #[derive(Debug, Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusTransport for CountingTransport {
        async fn fetch_status(&self) -> AppResult<StatusResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StatusResponse::new(200, "{}"))
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_context_tracks_current_user() {
        let ctx = AuthContext::new();
        assert!(ctx.current().is_none());
        ctx.login("user-1");
        assert_eq!(ctx.current().as_deref(), Some("user-1"));
        ctx.logout();
        assert!(ctx.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_follows_login_and_logout() {
        let transport = Arc::new(CountingTransport::default());
        let poller = Arc::new(SessionPoller::new(
            transport.clone(),
            Arc::new(FnObserver::new(|_| {}, |_| {})),
            Duration::from_secs(30),
        ));
        let ctx = AuthContext::new();
        let shutdown = CancellationToken::new();

        let handle = spawn_follower(Arc::clone(&poller), ctx.subscribe(), shutdown.clone());
        settle().await;
        assert!(!poller.is_active());

        ctx.login("user-1");
        settle().await;
        assert!(poller.is_active());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        ctx.logout();
        settle().await;
        assert!(!poller.is_active());

        ctx.login("user-2");
        settle().await;
        assert_eq!(poller.current_user().as_deref(), Some("user-2"));

        shutdown.cancel();
        handle.await.unwrap();
        assert!(!poller.is_active());
    }
}
