//! Session state, persistence, and the auth facade.

pub mod auth;
pub mod state;
pub mod store;

pub use auth::{AuthService, Credentials, LogOnlyNavigator, Navigator};
pub use state::{Role, Session, SessionManager, Subscription, TokenPair, User};
pub use store::{FileBackend, MemoryBackend, SessionStore, StorageBackend};
