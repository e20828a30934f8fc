//! Typed domain surfaces over the authenticated client.
//!
//! These are thin: every call goes through [`crate::http::ApiClient`], so
//! credential attachment, silent refresh, and error reporting apply
//! uniformly. No domain module talks to the transport directly.

pub mod pets;
pub mod tutors;

use serde::Deserialize;

/// Pagination envelope the API wraps list responses in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
}
