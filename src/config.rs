//! Client configuration loaded from environment or built explicitly.

use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 3;

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, no trailing slash (e.g. `https://api.example.com`).
    pub base_url: String,
    /// Timeout applied to domain and auth calls.
    pub request_timeout: Duration,
    /// Connect timeout for the underlying HTTP client.
    pub connect_timeout: Duration,
    /// Short timeout for health probes.
    pub health_timeout: Duration,
}

impl ApiConfig {
    /// Build a config for the given base URL with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }

    /// Load from `PATINHAS_API_URL` (required) plus optional
    /// `PATINHAS_REQUEST_TIMEOUT_SECS`. Returns `None` if the URL is missing.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("PATINHAS_API_URL").ok()?;
        let mut config = Self::new(base_url);
        config.request_timeout =
            Duration::from_secs(env_parse("PATINHAS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS));
        Some(config)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
