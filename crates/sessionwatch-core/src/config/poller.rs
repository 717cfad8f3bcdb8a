//! Session status poller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session status poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Absolute URL of the session status endpoint.
    #[serde(default = "default_status_url")]
    pub status_url: String,
    /// Seconds between two scheduled checks.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Per-request timeout in seconds. `None` leaves it to the transport.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// Credentials attached to every status request.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            interval_seconds: default_interval(),
            request_timeout_seconds: None,
            credentials: CredentialsConfig::default(),
        }
    }
}

impl PollerConfig {
    /// The polling interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// The request timeout as a [`Duration`], if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

/// Credentials sent with status requests.
///
/// Both may be set; the cookie carries the browser-style session and the
/// bearer token covers API deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Raw `Cookie` header value.
    #[serde(default)]
    pub cookie: Option<String>,
    /// Bearer token for the `Authorization` header.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl CredentialsConfig {
    /// Whether any credential is configured.
    pub fn is_empty(&self) -> bool {
        self.cookie.is_none() && self.bearer_token.is_none()
    }
}

fn default_status_url() -> String {
    "http://localhost:8080/api/auth/session-status".to_string()
}

fn default_interval() -> u64 {
    30
}
