use super::*;

// =============================================================================
// ApiConfig::from_env — env manipulation requires unsafe in edition 2024.
// We wrap in unsafe blocks; these tests run serially (single test thread).
// =============================================================================

/// # Safety
/// Tests must run with `--test-threads=1` to avoid env races.
unsafe fn clear_patinhas_env() {
    unsafe {
        std::env::remove_var("PATINHAS_API_URL");
        std::env::remove_var("PATINHAS_REQUEST_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_missing_url_returns_none() {
    unsafe { clear_patinhas_env() };
    assert!(ApiConfig::from_env().is_none());
}

#[test]
fn from_env_with_url_returns_defaults() {
    unsafe {
        clear_patinhas_env();
        std::env::set_var("PATINHAS_API_URL", "https://api.example.com/");
    }
    let config = ApiConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    unsafe { clear_patinhas_env() };
}

#[test]
fn from_env_honors_timeout_override() {
    unsafe {
        clear_patinhas_env();
        std::env::set_var("PATINHAS_API_URL", "https://api.example.com");
        std::env::set_var("PATINHAS_REQUEST_TIMEOUT_SECS", "5");
    }
    let config = ApiConfig::from_env().unwrap();
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    unsafe { clear_patinhas_env() };
}

#[test]
fn new_strips_trailing_slashes() {
    let config = ApiConfig::new("http://localhost:8080///");
    assert_eq!(config.base_url, "http://localhost:8080");
}

#[test]
fn new_defaults_health_timeout_short() {
    let config = ApiConfig::new("http://localhost");
    assert!(config.health_timeout < config.request_timeout);
}
