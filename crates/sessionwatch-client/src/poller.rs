//! Interval-driven session liveness poller.
//!
//! While a user is present the poller checks the status endpoint once
//! immediately and then once per interval. Each tick spawns its own check,
//! so a slow response can overlap the next tick. Stopping cancels the timer
//! and suppresses checks that have not yet issued their request; a request
//! already in flight is left to finish.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sessionwatch_core::config::poller::PollerConfig;
use sessionwatch_core::result::AppResult;
use sessionwatch_core::types::WatchId;

use crate::interpret::{CheckOutcome, interpret};
use crate::observer::SessionObserver;
use crate::transport::{HttpStatusTransport, StatusTransport};

/// Timer state of one activation.
struct ActiveWatch {
    uid: String,
    watch_id: WatchId,
    cancel: CancellationToken,
    _timer: JoinHandle<()>,
}

/// Periodically verifies that the current user's session is still valid.
pub struct SessionPoller {
    transport: Arc<dyn StatusTransport>,
    observer: Arc<dyn SessionObserver>,
    interval: Duration,
    active: Mutex<Option<ActiveWatch>>,
}

impl std::fmt::Debug for SessionPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPoller")
            .field("transport", &self.transport)
            .field("interval", &self.interval)
            .field("current_user", &self.current_user())
            .finish()
    }
}

impl SessionPoller {
    /// Create an inactive poller.
    pub fn new(
        transport: Arc<dyn StatusTransport>,
        observer: Arc<dyn SessionObserver>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            observer,
            interval,
            active: Mutex::new(None),
        }
    }

    /// Create an inactive poller talking HTTP to the configured endpoint.
    pub fn from_config(
        config: &PollerConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> AppResult<Self> {
        let transport = HttpStatusTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), observer, config.interval()))
    }

    /// The interval between scheduled checks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a timer is running.
    pub fn is_active(&self) -> bool {
        self.lock_active().is_some()
    }

    /// The user currently watched, if any.
    pub fn current_user(&self) -> Option<String> {
        self.lock_active().as_ref().map(|w| w.uid.clone())
    }

    /// Follow a change of the authenticated user.
    ///
    /// `None` stops polling, a new uid (re)starts it, the same uid is a no-op.
    pub fn set_user(&self, uid: Option<String>) {
        match uid {
            Some(uid) => self.start(uid),
            None => {
                self.stop();
            }
        }
    }

    /// Start watching `uid`: one immediate check, then one per interval.
    ///
    /// Must be called from within a tokio runtime. Restarts the timer if a
    /// different user was being watched.
    pub fn start(&self, uid: impl Into<String>) {
        let uid = uid.into();
        let mut active = self.lock_active();

        if active.as_ref().is_some_and(|current| current.uid == uid) {
            return;
        }
        if let Some(previous) = active.take() {
            Self::cancel(previous);
        }

        let watch_id = WatchId::new();
        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_timer(
            Arc::clone(&self.transport),
            Arc::clone(&self.observer),
            self.interval,
            uid.clone(),
            watch_id,
            cancel.clone(),
        ));

        info!(
            uid = %uid,
            watch_id = %watch_id,
            interval_secs = self.interval.as_secs(),
            "Session polling started"
        );

        *active = Some(ActiveWatch {
            uid,
            watch_id,
            cancel,
            _timer: timer,
        });
    }

    /// Stop polling. Returns `false` if the poller was already idle.
    pub fn stop(&self) -> bool {
        match self.lock_active().take() {
            Some(watch) => {
                Self::cancel(watch);
                true
            }
            None => false,
        }
    }

    /// Run one check for `uid` outside the timer and report what it saw.
    ///
    /// Observers are not invoked.
    pub async fn check_once(&self, uid: &str) -> AppResult<CheckOutcome> {
        let response = self.transport.fetch_status().await?;
        Ok(interpret(uid, &response))
    }

    fn cancel(watch: ActiveWatch) {
        watch.cancel.cancel();
        info!(uid = %watch.uid, watch_id = %watch.watch_id, "Session polling stopped");
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveWatch>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SessionPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    transport: Arc<dyn StatusTransport>,
    observer: Arc<dyn SessionObserver>,
    period: Duration,
    uid: String,
    watch_id: WatchId,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::spawn(run_check(
                    Arc::clone(&transport),
                    Arc::clone(&observer),
                    uid.clone(),
                    watch_id,
                    cancel.clone(),
                ));
            }
        }
    }

    debug!(uid = %uid, watch_id = %watch_id, "Session poll timer ended");
}

async fn run_check(
    transport: Arc<dyn StatusTransport>,
    observer: Arc<dyn SessionObserver>,
    uid: String,
    watch_id: WatchId,
    cancel: CancellationToken,
) {
    if cancel.is_cancelled() {
        return;
    }

    let response = match transport.fetch_status().await {
        Ok(response) => response,
        Err(e) => {
            warn!(uid = %uid, watch_id = %watch_id, error = %e, "Session status check failed");
            return;
        }
    };

    match interpret(&uid, &response) {
        CheckOutcome::Revoked(session) => observer.on_session_revoked(session),
        CheckOutcome::Updated(session) => observer.on_session_updated(session),
        CheckOutcome::NoSession => {
            debug!(uid = %uid, watch_id = %watch_id, "Status response carried no session");
        }
        CheckOutcome::Ignored { status } => {
            debug!(uid = %uid, watch_id = %watch_id, status, "Status response ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::observer::FnObserver;
    use crate::transport::StatusResponse;
    use sessionwatch_core::error::AppError;

    /// Transport that replays scripted responses, then repeats the last one.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<AppResult<StatusResponse>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<AppResult<StatusResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusTransport for ScriptedTransport {
        async fn fetch_status(&self) -> AppResult<StatusResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Ok(StatusResponse::new(200, "{}")))
            }
        }
    }

    #[derive(Default)]
    struct Counts {
        revoked: AtomicUsize,
        updated: AtomicUsize,
    }

    fn counting_observer(counts: &Arc<Counts>) -> Arc<dyn SessionObserver> {
        let r = Arc::clone(counts);
        let u = Arc::clone(counts);
        Arc::new(FnObserver::new(
            move |_| {
                r.revoked.fetch_add(1, Ordering::SeqCst);
            },
            move |_| {
                u.updated.fetch_add(1, Ordering::SeqCst);
            },
        ))
    }

    /// Let spawned tasks run without moving the paused clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_check_then_one_per_interval() {
        let transport = ScriptedTransport::new(vec![]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.start("user-1");
        settle().await;
        assert_eq!(transport.calls(), 1);

        time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(transport.calls(), 1);

        time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);

        time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(transport.calls(), 3);

        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_calls_after_stop() {
        let transport = ScriptedTransport::new(vec![]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.start("user-1");
        settle().await;
        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);

        assert!(poller.stop());
        assert!(!poller.stop());
        assert!(!poller.is_active());

        time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revocation_fires_once() {
        let transport = ScriptedTransport::new(vec![Ok(StatusResponse::new(
            401,
            r#"{"code":"SESSION_REVOKED","reason":"revoked_by_admin"}"#,
        ))]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.start("user-1");
        settle().await;
        poller.stop();

        assert_eq!(counts.revoked.load(Ordering::SeqCst), 1);
        assert_eq!(counts.updated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_and_empty_responses() {
        let transport = ScriptedTransport::new(vec![
            Ok(StatusResponse::new(
                200,
                r#"{"session":{"uid":"user-1","status":"active","jti":"j1"}}"#,
            )),
            Ok(StatusResponse::new(200, "{}")),
        ]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.start("user-1");
        settle().await;
        assert_eq!(counts.updated.load(Ordering::SeqCst), 1);

        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(counts.updated.load(Ordering::SeqCst), 1);
        assert_eq!(counts.revoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_absorbed() {
        let transport = ScriptedTransport::new(vec![
            Err(AppError::external_service("connection refused")),
            Ok(StatusResponse::new(
                200,
                r#"{"session":{"uid":"user-1","status":"active"}}"#,
            )),
        ]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.start("user-1");
        settle().await;
        assert_eq!(counts.updated.load(Ordering::SeqCst), 0);
        assert!(poller.is_active());

        time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(counts.updated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_user_transitions() {
        let transport = ScriptedTransport::new(vec![]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        poller.set_user(None);
        settle().await;
        assert!(!poller.is_active());
        assert_eq!(transport.calls(), 0);

        poller.set_user(Some("a".to_string()));
        settle().await;
        assert_eq!(transport.calls(), 1);

        poller.set_user(Some("a".to_string()));
        settle().await;
        assert_eq!(transport.calls(), 1);

        poller.set_user(Some("b".to_string()));
        settle().await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(poller.current_user().as_deref(), Some("b"));

        poller.set_user(None);
        time::advance(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let transport = ScriptedTransport::new(vec![]);
        let counts = Arc::new(Counts::default());
        {
            let poller = SessionPoller::new(
                transport.clone(),
                counting_observer(&counts),
                Duration::from_secs(30),
            );
            poller.start("user-1");
            settle().await;
        }
        time::advance(Duration::from_secs(90)).await;
        settle().await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_check_once_reports_outcome() {
        let transport = ScriptedTransport::new(vec![Ok(StatusResponse::new(
            401,
            r#"{"code":"SESSION_REVOKED"}"#,
        ))]);
        let counts = Arc::new(Counts::default());
        let poller = SessionPoller::new(
            transport.clone(),
            counting_observer(&counts),
            Duration::from_secs(30),
        );

        let outcome = poller.check_once("user-1").await.unwrap();
        assert_eq!(outcome.label(), "revoked");
        assert_eq!(counts.revoked.load(Ordering::SeqCst), 0);
        assert!(!poller.is_active());
    }
}
