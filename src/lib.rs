//! Client-side access layer for the Patinhas pet/tutor management API.
//!
//! ARCHITECTURE
//! ============
//! Everything rides on one interception pipeline: requests dispatched
//! through [`http::ApiClient`] are stamped with the current access token,
//! transparently recovered from authorization expiry by a single shared
//! refresh episode, and classified/reported on terminal failure. Session
//! state lives in exactly one [`session::SessionManager`] per process,
//! constructed at the composition root and shared by reference; the
//! persisted record survives reloads and propagates across sibling
//! contexts.
//!
//! UI code consumes three things: the subscribe-able session state, the
//! [`session::AuthService`] facade, and the pre-configured client. It
//! never attaches tokens or handles 401s itself.

pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod http;
pub mod session;

use std::sync::Arc;

pub use config::ApiConfig;
pub use error::ApiError;

use http::report::Notifier;
use http::transport::{ReqwestTransport, TransportError};
use http::ApiClient;
use session::auth::Navigator;
use session::store::FileBackend;
use session::{AuthService, SessionManager, SessionStore};

/// Everything an embedder needs, wired at the composition root.
pub struct Handles {
    pub session: Arc<SessionManager>,
    pub client: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
}

/// Wire the full stack over a real transport: file-backed persistence
/// under `state_dir`, session restored from it, one shared client.
pub fn bootstrap(
    config: &ApiConfig,
    state_dir: impl Into<std::path::PathBuf>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
) -> Result<Handles, TransportError> {
    let transport: Arc<dyn http::HttpTransport> = Arc::new(ReqwestTransport::new(config)?);
    let store = Arc::new(SessionStore::new(Arc::new(FileBackend::new(state_dir))));
    let session = SessionManager::restore(store);
    let client = Arc::new(ApiClient::new(
        Arc::clone(&transport),
        Arc::clone(&session),
        Arc::clone(&navigator),
        notifier,
    ));
    let auth = Arc::new(AuthService::new(
        transport,
        Arc::clone(&session),
        Arc::clone(&client),
        navigator,
    ));
    Ok(Handles { session, client, auth })
}
