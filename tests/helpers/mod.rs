//! Shared test helpers for integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sessionwatch_client::{StatusResponse, StatusTransport};
use sessionwatch_core::result::AppResult;

/// Status transport replaying a script; the last entry repeats forever.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<AppResult<StatusResponse>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Create a transport from scripted responses
    pub fn new(script: Vec<AppResult<StatusResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of requests issued so far
    pub fn calls(&self) -> usize {
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

/// An active session body for `uid`
pub fn active_body(uid: &str) -> StatusResponse {
    StatusResponse::new(
        200,
        serde_json::json!({
            "session": {
                "uid": uid,
                "status": "active",
                "deviceInfo": "integration-test",
                "createdAt": "2024-05-01T08:00:00.000Z",
                "lastActivity": "2024-05-01T08:00:00.000Z",
                "jti": "jti-current"
            }
        })
        .to_string(),
    )
}

/// A revocation body
pub fn revoked_body(reason: &str, replaced_by: &str) -> StatusResponse {
    StatusResponse::new(
        401,
        serde_json::json!({
            "code": "SESSION_REVOKED",
            "reason": reason,
            "replacedBy": replaced_by,
            "error": "Session révoquée"
        })
        .to_string(),
    )
}

/// Let spawned tasks run without moving the paused clock
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
