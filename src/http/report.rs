//! Terminal error classification and user-facing notification.
//!
//! DESIGN
//! ======
//! Every terminal failure is classified into an [`ApiError`] and logged
//! with full request context. At most one user-visible notification is
//! emitted per distinct error (stable key: status code, or the server
//! message text), so a burst of identical failures does not spam the user.
//! 401s never reach this stage — the refresh coordinator owns them.
//!
//! The notification is a convenience default: the classified error is
//! still returned to the caller, who may handle it locally (e.g. render a
//! 404 as an empty state) instead of relying on the toast.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ApiError;
use crate::http::transport::{ApiRequest, RawResponse, TransportError};

const MSG_FORBIDDEN: &str = "Acesso negado.";
const MSG_NOT_FOUND: &str = "Recurso não encontrado.";
const MSG_UNEXPECTED: &str = "Ocorreu um erro inesperado.";
const MSG_SERVER: &str = "Erro no servidor. Tente novamente mais tarde.";
const MSG_NETWORK: &str = "Falha de conexão. Verifique sua internet.";

/// Sink for user-visible notifications. The console UI injects a
/// toast-backed implementation; [`TracingNotifier`] is the default.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: surfaces messages through the log only.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(message, "user notification");
    }
}

/// Map a terminal (non-401) response to its error value.
#[must_use]
pub fn classify_response(status: u16, body: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound,
        400 => match server_message(body) {
            Some(message) => ApiError::BadRequest(message),
            None => ApiError::BadRequest(MSG_UNEXPECTED.into()),
        },
        status if (400..500).contains(&status) => ApiError::Client {
            status,
            message: server_message(body).unwrap_or_else(|| MSG_UNEXPECTED.into()),
        },
        status => ApiError::Server { status },
    }
}

/// Pull the server-provided human message out of an error body, if any.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

/// The notification text for an already-classified error.
fn notification_text(error: &ApiError) -> Option<String> {
    match error {
        // 401 is the refresh coordinator's business, never a toast.
        ApiError::Unauthorized | ApiError::SessionExpired(_) => None,
        ApiError::Forbidden => Some(MSG_FORBIDDEN.into()),
        ApiError::NotFound => Some(MSG_NOT_FOUND.into()),
        ApiError::BadRequest(message) | ApiError::Client { message, .. } => Some(message.clone()),
        ApiError::Server { .. } => Some(MSG_SERVER.into()),
        ApiError::Network(_) => Some(MSG_NETWORK.into()),
        ApiError::Decode(_) => Some(MSG_UNEXPECTED.into()),
    }
}

/// Stable dedup key: status code when there is one, message text otherwise.
fn dedup_key(error: &ApiError) -> String {
    match error {
        ApiError::BadRequest(message) | ApiError::Client { message, .. } => message.clone(),
        other => match other.status() {
            Some(status) => status.to_string(),
            None => other.to_string(),
        },
    }
}

/// Classifies terminal failures, logs them, and notifies once per distinct
/// error.
pub struct ErrorReporter {
    notifier: Arc<dyn Notifier>,
    seen: Mutex<HashSet<String>>,
}

impl ErrorReporter {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier, seen: Mutex::new(HashSet::new()) }
    }

    /// Classify a non-success response, log it with full context, and
    /// surface at most one notification for it.
    pub fn report_response(&self, request: &ApiRequest, response: &RawResponse) -> ApiError {
        let error = classify_response(response.status, &response.body);
        tracing::error!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            body = %response.body,
            "api request failed"
        );
        self.maybe_notify(&error);
        error
    }

    /// Report a request that got no response at all.
    pub fn report_network(&self, request: &ApiRequest, cause: &TransportError) -> ApiError {
        let error = ApiError::Network(cause.to_string());
        tracing::error!(
            method = %request.method,
            path = %request.path,
            error = %cause,
            "api request got no response"
        );
        self.maybe_notify(&error);
        error
    }

    /// Forget previously seen errors, re-arming their notifications.
    /// Embedders call this on navigation.
    pub fn reset(&self) {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn maybe_notify(&self, error: &ApiError) {
        let Some(text) = notification_text(error) else {
            return;
        };
        let fresh = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dedup_key(error));
        if fresh {
            self.notifier.notify(&text);
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
