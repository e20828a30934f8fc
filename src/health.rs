//! API health probe.
//!
//! The backend reported health in two vocabularies over time (`"pass"` /
//! `"fail"` and `"UP"` / `"DOWN"`). One canonical enum is declared here;
//! every legacy spelling is accepted on deserialize and normalized, so the
//! rest of the system never sees the inconsistency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::transport::{ApiRequest, HttpTransport, RawResponse};

pub const HEALTH_PATH: &str = "/health";

/// Canonical health vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[serde(alias = "pass", alias = "ok", alias = "UP")]
    Up,
    #[serde(alias = "fail", alias = "error", alias = "DOWN")]
    Down,
    #[serde(alias = "warn", alias = "DEGRADED")]
    Degraded,
}

/// What the health endpoint reports.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Per-component statuses, when the endpoint breaks them out.
    #[serde(default)]
    pub components: HashMap<String, HealthStatus>,
}

/// Probe the API's health endpoint. Runs anonymously and on a short
/// timeout; a probe that cannot reach the API reports `Down` rather than
/// erroring, since that is exactly what the status page wants to show.
pub async fn probe(
    transport: &dyn HttpTransport,
    timeout: std::time::Duration,
) -> Result<HealthReport, ApiError> {
    let request = ApiRequest::new(reqwest::Method::GET, HEALTH_PATH).with_timeout(timeout);
    match transport.execute(&request).await {
        Ok(response) if response.is_success() => parse_report(&response),
        Ok(response) => {
            tracing::warn!(status = response.status, "health endpoint unhealthy");
            Ok(HealthReport { status: HealthStatus::Down, components: HashMap::new() })
        }
        Err(e) => {
            tracing::warn!(error = %e, "health probe got no response");
            Ok(HealthReport { status: HealthStatus::Down, components: HashMap::new() })
        }
    }
}

fn parse_report(response: &RawResponse) -> Result<HealthReport, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "health_test.rs"]
mod tests;
