//! Transport for the session status endpoint.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};

use sessionwatch_core::config::poller::PollerConfig;
use sessionwatch_core::error::AppError;
use sessionwatch_core::result::AppResult;

/// Raw answer from the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, unparsed.
    pub body: String,
}

impl StatusResponse {
    /// Build a response from a status code and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Fetches the current session status.
///
/// `Err` is reserved for transport failures; every HTTP answer, whatever
/// its status, is an `Ok(StatusResponse)`.
#[async_trait]
pub trait StatusTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Issue one status request.
    async fn fetch_status(&self) -> AppResult<StatusResponse>;
}

/// [`StatusTransport`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpStatusTransport {
    client: reqwest::Client,
    status_url: String,
}

impl HttpStatusTransport {
    /// Build a transport from poller configuration.
    ///
    /// Credentials and the fixed request headers are installed as client
    /// defaults so every request carries them.
    pub fn new(config: &PollerConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        if let Some(cookie) = &config.credentials.cookie {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|e| AppError::configuration(format!("Invalid cookie header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        if let Some(token) = &config.credentials.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AppError::configuration(format!("Invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            status_url: config.status_url.clone(),
        })
    }

    /// The endpoint this transport queries.
    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

#[async_trait]
impl StatusTransport for HttpStatusTransport {
    async fn fetch_status(&self) -> AppResult<StatusResponse> {
        let response = self
            .client
            .get(&self.status_url)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(format!(
                    "Session status request to {} failed: {e}",
                    self.status_url
                ))
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            AppError::external_service(format!("Failed to read session status body: {e}"))
        })?;

        tracing::trace!(status, bytes = body.len(), "Session status response received");
        Ok(StatusResponse { status, body })
    }
}
