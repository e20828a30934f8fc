//! Transport seam between the interception pipeline and the wire.
//!
//! DESIGN
//! ======
//! The pipeline (credential attachment, refresh, reporting) is written
//! against the object-safe [`HttpTransport`] trait rather than a concrete
//! client, so every refresh/queueing scenario is testable with an in-memory
//! mock. [`ReqwestTransport`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ApiConfig;

/// One outgoing request, as the pipeline sees it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    /// Path relative to the API base URL, leading slash (e.g. `/v1/pets`).
    pub path: String,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Bearer credential. Stamped by the credential attachment stage; the
    /// refresh call sets it to the refresh token directly.
    pub bearer: Option<String>,
    /// Per-request timeout override (health probes run shorter).
    pub timeout: Option<Duration>,
    /// Whether this request has already been retried once after a refresh.
    /// Guards against infinite refresh loops.
    pub retried: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: reqwest::Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, bearer: None, timeout: None, retried: false }
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status and body of a settled HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to get any response at all (connect, TLS, timeout, body read).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("http client build failed: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Send(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Executes one request against the remote API. Implementations do not
/// retry, refresh, or classify; that is the pipeline's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

/// Production transport over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport with the config's timeouts applied client-wide.
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| TransportError::Send(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
