//! Session state holder — the single source of truth for the
//! authenticated session.
//!
//! DESIGN
//! ======
//! One `SessionManager` exists per composition root and is shared as
//! `Arc<SessionManager>` by the HTTP client, the refresh coordinator, and
//! any UI bindings. Consumers never hold a copy of the session; they read
//! `current()` or subscribe for changes.
//!
//! Notification is synchronous with the mutating call: by the time
//! `set_authenticated` returns, every subscriber has already observed the
//! new value, in mutation order. Mutation and delivery happen under one
//! lock, so observers must not call back into the manager.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};

use super::store::SessionStore;

/// Access/refresh token pair issued by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

/// Role assigned by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Identity record for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Snapshot of the authenticated session.
///
/// Invariant: `is_authenticated` implies `tokens.is_some()`. `user` may be
/// absent even when authenticated (session restored from storage before the
/// profile has been fetched).
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
    pub tokens: Option<TokenPair>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

type Observer = Box<dyn Fn(&Session) + Send + Sync>;

struct Inner {
    session: Session,
    observers: Vec<(u64, Observer)>,
    next_id: u64,
}

/// Holder of the single current [`Session`] value.
pub struct SessionManager {
    inner: Mutex<Inner>,
    store: Arc<SessionStore>,
}

impl SessionManager {
    /// Create a manager with an empty, unauthenticated session.
    #[must_use]
    pub fn new(store: Arc<SessionStore>) -> Arc<Self> {
        Self::with_session(store, Session::default())
    }

    /// Create a manager seeded from the persisted record, if one survives
    /// the store's validity checks. Used at process start.
    #[must_use]
    pub fn restore(store: Arc<SessionStore>) -> Arc<Self> {
        let session = store.load().map_or_else(Session::default, |record| Session {
            user: record.user,
            tokens: Some(record.tokens),
            is_authenticated: true,
            is_loading: false,
        });
        Self::with_session(store, session)
    }

    fn with_session(store: Arc<SessionStore>, session: Session) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner { session, observers: Vec::new(), next_id: 0 }),
            store,
        })
    }

    /// Latest session value. Never blocks on I/O, never empty.
    #[must_use]
    pub fn current(&self) -> Session {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).session.clone()
    }

    /// Register an observer. It receives the current value immediately,
    /// then every subsequent value in mutation order. Delivery stops when
    /// the returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe(
        self: &Arc<Self>,
        observer: impl Fn(&Session) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        observer(&inner.session);
        inner.observers.push((id, Box::new(observer)));
        Subscription { id, manager: Arc::downgrade(self) }
    }

    fn unsubscribe(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// Mutate the session and notify all observers before returning.
    fn mutate(&self, apply: impl FnOnce(&mut Session)) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut inner.session);
        let session = inner.session.clone();
        for (_, observer) in &inner.observers {
            observer(&session);
        }
    }

    /// Atomically install a full authenticated session and persist it.
    pub fn set_authenticated(&self, user: Option<User>, tokens: TokenPair) {
        self.store.save(&tokens, user.as_ref());
        self.mutate(|session| {
            session.user = user;
            session.tokens = Some(tokens);
            session.is_authenticated = true;
            session.is_loading = false;
        });
    }

    /// Replace only the token pair, preserving user and authenticated flag.
    pub fn update_tokens(&self, tokens: TokenPair) {
        self.store.save(&tokens, None);
        self.mutate(|session| {
            session.tokens = Some(tokens);
        });
    }

    /// Toggle the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.mutate(|session| {
            session.is_loading = loading;
        });
    }

    /// Reset to the unauthenticated default and erase the persisted record.
    pub fn clear(&self) {
        self.store.clear();
        self.mutate(|session| {
            *session = Session::default();
        });
    }

    /// Apply a storage change observed out-of-band (another tab or process
    /// writing the same keys).
    ///
    /// An empty/absent new value on the access-token key means a sibling
    /// logged out: reset to unauthenticated. A non-empty new value on either
    /// token key means a sibling logged in or refreshed: reload the
    /// persisted record into memory.
    pub fn apply_external_change(&self, key: &str, new_value: Option<&str>) {
        let store = &self.store;
        if key == store.access_token_key() && new_value.is_none_or(str::is_empty) {
            tracing::info!("external logout observed, resetting session");
            self.mutate(|session| {
                *session = Session::default();
            });
            return;
        }
        if (key == store.access_token_key() || key == store.refresh_token_key())
            && new_value.is_some_and(|value| !value.is_empty())
        {
            if let Some(record) = store.load() {
                tracing::info!("external login/refresh observed, reloading session");
                self.mutate(|session| {
                    if record.user.is_some() {
                        session.user = record.user;
                    }
                    session.tokens = Some(record.tokens);
                    session.is_authenticated = true;
                });
            }
        }
    }
}

/// Handle for an active observer registration. Cancelling (or dropping)
/// stops delivery; no other side effects.
pub struct Subscription {
    id: u64,
    manager: Weak<SessionManager>,
}

impl Subscription {
    /// Stop delivery explicitly.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.unsubscribe(self.id);
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::session::store::{MemoryBackend, SessionStore};

    /// Manager backed by a fresh in-memory store.
    #[must_use]
    pub fn memory_manager() -> Arc<SessionManager> {
        SessionManager::new(Arc::new(SessionStore::new(Arc::new(MemoryBackend::new()))))
    }

    /// Manager plus a handle on its backing store.
    #[must_use]
    pub fn memory_manager_with_store() -> (Arc<SessionManager>, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(Arc::new(MemoryBackend::new())));
        (SessionManager::new(Arc::clone(&store)), store)
    }

    /// A dummy user record.
    #[must_use]
    pub fn dummy_user() -> User {
        User {
            id: "u-1".into(),
            display_name: "Ada".into(),
            email: Some("ada@example.com".into()),
            tax_id: None,
            role: Role::Admin,
        }
    }

    /// A JWT-shaped token pair (three non-empty dot-separated segments).
    #[must_use]
    pub fn dummy_tokens() -> TokenPair {
        TokenPair::new("aaa.bbb.ccc", "ddd.eee.fff")
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
