//! Silent token refresh with global mutual exclusion and request queueing.
//!
//! ARCHITECTURE
//! ============
//! When a request fails with 401, the first task to observe it becomes the
//! refresher: it flips the episode flag, calls the refresh endpoint
//! (directly on the transport, bypassing the interception pipeline), and
//! installs the new pair in the session. Every other task that hits a 401
//! while the episode is open parks a oneshot waiter and suspends. When the
//! refresh settles, the queue is drained front-to-back — every waiter gets
//! the fresh access token, or the refresh failure — and the coordinator
//! returns to idle. Exactly one refresh call is ever in flight per process.
//!
//! The flag and the queue live behind one mutex that is only ever taken in
//! synchronous sections (never across an await), so check-then-set is
//! atomic under any executor.
//!
//! An unrecoverable failure (no refresh token, refresh endpoint error of
//! any kind) tears the session down: state cleared, persisted record
//! erased, navigation to the login surface. The refresh call itself is
//! attempted exactly once per episode, with no backoff.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::http::transport::{ApiRequest, HttpTransport};
use crate::session::auth::Navigator;
use crate::session::state::{SessionManager, TokenPair};

/// The refresh endpoint. 401s from this path never re-enter the refresh
/// flow.
pub const REFRESH_PATH: &str = "/autenticacao/refresh";

type Waiter = oneshot::Sender<Result<String, ApiError>>;

#[derive(Default)]
struct Episode {
    refreshing: bool,
    waiters: Vec<Waiter>,
}

/// Token-pair payload returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[allow(dead_code)]
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}

impl TokenResponse {
    pub fn into_pair(self) -> TokenPair {
        TokenPair::new(self.access_token, self.refresh_token)
    }
}

/// Coordinates at-most-one concurrent token refresh.
pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    episode: Mutex<Episode>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { transport, session, navigator, episode: Mutex::new(Episode::default()) }
    }

    /// Recover from a 401: join the in-flight episode if there is one,
    /// otherwise run the refresh. Resolves with the fresh access token the
    /// caller should retry with, or the refresh failure.
    pub async fn recover(&self) -> Result<String, ApiError> {
        // Check-then-set happens under the lock, before any await.
        let parked = {
            let mut episode = self.episode.lock().unwrap_or_else(PoisonError::into_inner);
            if episode.refreshing {
                let (tx, rx) = oneshot::channel();
                episode.waiters.push(tx);
                Some(rx)
            } else {
                episode.refreshing = true;
                None
            }
        };

        if let Some(rx) = parked {
            return match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(ApiError::SessionExpired("refresh episode abandoned".into())),
            };
        }

        // This task owns the episode.
        let refresh_token = self
            .session
            .current()
            .tokens
            .map(|tokens| tokens.refresh_token)
            .filter(|token| !token.is_empty());

        let Some(refresh_token) = refresh_token else {
            let error = ApiError::SessionExpired("no refresh token available".into());
            self.settle_failure(&error);
            return Err(error);
        };

        match self.call_refresh_endpoint(&refresh_token).await {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                self.session.update_tokens(tokens);
                self.settle_success(&access_token);
                Ok(access_token)
            }
            Err(error) => {
                self.settle_failure(&error);
                Err(error)
            }
        }
    }

    /// One attempt against the refresh endpoint, straight on the transport
    /// so it cannot recursively enter the interception pipeline.
    async fn call_refresh_endpoint(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let mut request = ApiRequest::new(reqwest::Method::POST, REFRESH_PATH);
        request.bearer = Some(refresh_token.to_owned());

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| ApiError::SessionExpired(format!("refresh request failed: {e}")))?;

        if !response.is_success() {
            return Err(ApiError::SessionExpired(format!(
                "refresh endpoint returned {}",
                response.status
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::SessionExpired(format!("malformed refresh response: {e}")))?;
        Ok(parsed.into_pair())
    }

    /// Drain the queue with the fresh token and return to idle. Waiters
    /// are taken and the flag lowered in one critical section, so no
    /// waiter can be stranded between episodes.
    fn settle_success(&self, access_token: &str) {
        tracing::info!("token refresh succeeded");
        for waiter in self.take_waiters() {
            let _ = waiter.send(Ok(access_token.to_owned()));
        }
    }

    /// Drain the queue rejecting every entry, then tear the session down.
    fn settle_failure(&self, error: &ApiError) {
        tracing::warn!(error = %error, "token refresh failed");
        for waiter in self.take_waiters() {
            let _ = waiter.send(Err(error.clone()));
        }
        self.teardown();
    }

    fn take_waiters(&self) -> Vec<Waiter> {
        let mut episode = self.episode.lock().unwrap_or_else(PoisonError::into_inner);
        episode.refreshing = false;
        std::mem::take(&mut episode.waiters)
    }

    /// Clear all session state (memory and persisted) and send the user to
    /// the login surface. The coordinator is the only component that
    /// triggers this.
    pub fn teardown(&self) {
        tracing::warn!("tearing down session");
        self.session.clear();
        self.navigator.to_login();
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
