//! The pre-configured API client callers consume.
//!
//! Every request dispatched here is stamped with the current access token,
//! recovered transparently through the refresh coordinator on 401, and
//! classified/reported on terminal failure. Callers never attach tokens or
//! handle 401s themselves.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::refresh::{RefreshCoordinator, REFRESH_PATH};
use crate::http::report::{ErrorReporter, Notifier};
use crate::http::transport::{ApiRequest, HttpTransport, RawResponse};
use crate::session::auth::Navigator;
use crate::session::state::SessionManager;

/// Authenticated HTTP client over the interception pipeline.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionManager>,
    refresh: RefreshCoordinator,
    reporter: ErrorReporter,
}

impl ApiClient {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let refresh =
            RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(&session), navigator);
        Self { transport, session, refresh, reporter: ErrorReporter::new(notifier) }
    }

    pub async fn get(&self, path: &str) -> Result<RawResponse, ApiError> {
        self.dispatch(ApiRequest::new(reqwest::Method::GET, path)).await
    }

    pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<RawResponse, ApiError> {
        self.dispatch(ApiRequest::new(reqwest::Method::POST, path).with_body(to_json(body)?)).await
    }

    pub async fn put(&self, path: &str, body: &impl Serialize) -> Result<RawResponse, ApiError> {
        self.dispatch(ApiRequest::new(reqwest::Method::PUT, path).with_body(to_json(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> Result<RawResponse, ApiError> {
        self.dispatch(ApiRequest::new(reqwest::Method::DELETE, path)).await
    }

    /// GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(&self.get(path).await?)
    }

    /// POST and decode the JSON body.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        decode(&self.post(path, body).await?)
    }

    /// PUT and decode the JSON body.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        decode(&self.put(path, body).await?)
    }

    /// Forget previously reported errors, re-arming their notifications.
    pub fn reset_reported_errors(&self) {
        self.reporter.reset();
    }

    /// Run one request through the full pipeline. A request makes at most
    /// two trips: the original attempt and one retry after a refresh.
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<RawResponse, ApiError> {
        loop {
            // Credential attachment: stamp the current access token when
            // the session holds one; anonymous endpoints go out
            // unmodified. This stage never blocks, never fails, never
            // reads the response.
            request.bearer = self.session.current().tokens.map(|tokens| tokens.access_token);

            let response = match self.transport.execute(&request).await {
                Ok(response) => response,
                Err(cause) => return Err(self.reporter.report_network(&request, &cause)),
            };

            if response.status == 401 {
                // Loop prevention: a request that already used its retry,
                // or one aimed at the refresh endpoint itself, never
                // re-enters the refresh flow.
                if request.retried || request.path == REFRESH_PATH {
                    tracing::warn!(path = %request.path, "401 on an already retried request");
                    self.refresh.teardown();
                    return Err(ApiError::Unauthorized);
                }
                self.refresh.recover().await?;
                request.retried = true;
                // Going around again picks up the freshly installed token.
                continue;
            }

            if !response.is_success() {
                return Err(self.reporter.report_response(&request, &response));
            }

            return Ok(response);
        }
    }
}

fn to_json(body: &impl Serialize) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
