//! Crate-wide error taxonomy for API calls.
//!
//! ERROR HANDLING
//! ==============
//! One variant per class of terminal outcome, following the remote API's
//! status contract. `ApiError` is `Clone` because a single refresh failure
//! must be delivered to every request queued behind that refresh.

/// Terminal outcome of an API call, after credential attachment, silent
/// refresh, and retry have all had their chance.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// 401 that could not be recovered (the request was already retried
    /// once, or it targeted the refresh endpoint itself).
    #[error("authorization required")]
    Unauthorized,
    /// The refresh attempt itself failed; the session has been torn down.
    #[error("session expired: {0}")]
    SessionExpired(String),
    /// 403 from the API.
    #[error("access denied")]
    Forbidden,
    /// 404 from the API. Callers may handle this locally (empty state)
    /// instead of surfacing the default notification.
    #[error("resource not found")]
    NotFound,
    /// 400 with the server-provided message, when one was present.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Any other 4xx.
    #[error("request failed ({status}): {message}")]
    Client { status: u16, message: String },
    /// Any 5xx.
    #[error("server error ({status})")]
    Server { status: u16 },
    /// No response at all: connect failure, timeout, DNS, TLS.
    #[error("network error: {0}")]
    Network(String),
    /// The response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status this error was classified from, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::Client { status, .. } | Self::Server { status } => Some(*status),
            Self::SessionExpired(_) | Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
