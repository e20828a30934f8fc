//! Auth facade — the only entry point UI code calls for identity
//! operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::client::ApiClient;
use crate::http::refresh::TokenResponse;
use crate::http::report::classify_response;
use crate::http::transport::{ApiRequest, HttpTransport};
use crate::session::state::{SessionManager, User};

pub const LOGIN_PATH: &str = "/autenticacao/login";
pub const LOGOUT_PATH: &str = "/autenticacao/logout";
pub const ME_PATH: &str = "/v1/auth/me";

/// Where the user lands after a teardown or logout. The console's router
/// supplies the real implementation.
pub trait Navigator: Send + Sync {
    fn to_login(&self);
}

/// Fallback navigator for embedders without a routing surface.
pub struct LogOnlyNavigator;

impl Navigator for LogOnlyNavigator {
    fn to_login(&self) {
        tracing::info!("navigation to login requested");
    }
}

/// Login form payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login response: the token pair, plus the user profile when the API
/// chooses to embed one.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(flatten)]
    tokens: TokenResponse,
    #[serde(default)]
    user: Option<User>,
}

/// Identity operations coordinating the state holder and the remote auth
/// endpoints.
pub struct AuthService {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionManager>,
    client: Arc<ApiClient>,
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionManager>,
        client: Arc<ApiClient>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self { transport, session, client, navigator }
    }

    /// Authenticate against the remote API and install the session.
    /// The loading flag is raised for the duration of the call and is
    /// guaranteed to be down again on both outcomes.
    pub async fn login(&self, credentials: Credentials) -> Result<(), ApiError> {
        self.session.set_loading(true);
        let result = self.do_login(&credentials).await;
        if result.is_err() {
            // The success path drops the flag inside set_authenticated.
            self.session.set_loading(false);
        }
        result
    }

    async fn do_login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        // Login is anonymous and must never trigger the refresh flow, so
        // it goes straight to the transport.
        let request = ApiRequest::new(reqwest::Method::POST, LOGIN_PATH).with_body(
            serde_json::json!({
                "username": credentials.username,
                "password": credentials.password,
            }),
        );
        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "login rejected");
            return Err(classify_response(response.status, &response.body));
        }

        let parsed: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        // The API may not return a profile; derive a minimal one from the
        // credentials so the UI has a display name immediately.
        let user = parsed.user.unwrap_or_else(|| User {
            id: credentials.username.clone(),
            display_name: credentials.username.clone(),
            email: None,
            tax_id: None,
            role: crate::session::state::Role::User,
        });

        self.session.set_authenticated(Some(user), parsed.tokens.into_pair());
        tracing::info!("login succeeded");
        Ok(())
    }

    /// End the session. The remote call is best-effort; local cleanup and
    /// navigation happen regardless of its outcome.
    pub async fn logout(&self) {
        if let Some(tokens) = self.session.current().tokens {
            let mut request = ApiRequest::new(reqwest::Method::POST, LOGOUT_PATH);
            request.bearer = Some(tokens.access_token);
            if let Err(e) = self.transport.execute(&request).await {
                tracing::warn!(error = %e, "remote logout failed, clearing locally anyway");
            }
        }
        self.session.clear();
        self.navigator.to_login();
    }

    /// Synchronous snapshot: is there an authenticated session right now?
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.current().is_authenticated
    }

    /// Synchronous snapshot of the current user, if known.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current().user
    }

    /// Fetch the profile from the API and install it, preserving the
    /// current tokens. Goes through the full pipeline, so a stale access
    /// token is refreshed transparently on the way.
    pub async fn fetch_current_user(&self) -> Result<(), ApiError> {
        let user: User = self.client.get_json(ME_PATH).await?;
        if let Some(tokens) = self.session.current().tokens {
            self.session.set_authenticated(Some(user), tokens);
        }
        Ok(())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Navigator that records every navigation it is asked to perform.
    #[derive(Default)]
    pub struct RecordingNavigator {
        destinations: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn destinations(&self) -> Vec<String> {
            self.destinations.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn to_login(&self) {
            self.destinations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push("/login".to_owned());
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
