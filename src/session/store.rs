//! Durable persistence for the session record.
//!
//! DESIGN
//! ======
//! The record is three independent string entries under fixed, prefixed
//! keys (access token, refresh token, user profile JSON), mirroring the
//! browser-storage layout the console's sibling tabs share. The backing
//! key-value store is pluggable: a file-per-key directory backend for real
//! use, an in-memory backend for tests and ephemeral embedders.
//!
//! ERROR HANDLING
//! ==============
//! Persistence is best-effort. Every backend failure is logged and
//! swallowed — a read-only disk or missing directory degrades to "session
//! not persisted", never to a crash in the caller.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use super::state::{TokenPair, User};

// All keys share the "patinhas." prefix so they never collide with
// unrelated entries in a shared backend.
const ACCESS_TOKEN_KEY: &str = "patinhas.access_token";
const REFRESH_TOKEN_KEY: &str = "patinhas.refresh_token";
const USER_KEY: &str = "patinhas.user";

/// Raw key-value storage the session store writes through.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// What `load()` hands back when a valid record survives on disk.
#[derive(Debug, Clone)]
pub struct PersistedRecord {
    pub tokens: TokenPair,
    pub user: Option<User>,
}

/// Persistent mirror of the session's tokens and user profile.
pub struct SessionStore {
    backend: Arc<dyn StorageBackend>,
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn access_token_key(&self) -> &'static str {
        ACCESS_TOKEN_KEY
    }

    #[must_use]
    pub fn refresh_token_key(&self) -> &'static str {
        REFRESH_TOKEN_KEY
    }

    #[must_use]
    pub fn user_key(&self) -> &'static str {
        USER_KEY
    }

    /// Read the persisted record.
    ///
    /// Tokens that are present but not JWT-shaped are treated as corrupt:
    /// all three keys are discarded and `None` is returned. An unparsable
    /// stored user degrades to `user: None` with valid tokens still
    /// trusted.
    #[must_use]
    pub fn load(&self) -> Option<PersistedRecord> {
        let (access, refresh) = match (self.read(ACCESS_TOKEN_KEY), self.read(REFRESH_TOKEN_KEY)) {
            (None, None) => return None,
            (Some(access), Some(refresh)) if is_jwt_shaped(&access) && is_jwt_shaped(&refresh) => {
                (access, refresh)
            }
            // Half a token pair is as unusable as a malformed one.
            _ => {
                tracing::warn!("persisted tokens failed shape validation, discarding");
                self.clear();
                return None;
            }
        };

        let user = self.read(USER_KEY).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|e| tracing::warn!(error = %e, "persisted user unparsable, ignoring"))
                .ok()
        });

        Some(PersistedRecord { tokens: TokenPair::new(access, refresh), user })
    }

    /// Write tokens unconditionally; write the user only when provided
    /// (omitting it does not erase a previously stored profile).
    pub fn save(&self, tokens: &TokenPair, user: Option<&User>) {
        self.write(ACCESS_TOKEN_KEY, &tokens.access_token);
        self.write(REFRESH_TOKEN_KEY, &tokens.refresh_token);
        if let Some(user) = user {
            match serde_json::to_string(user) {
                Ok(json) => self.write(USER_KEY, &json),
                Err(e) => tracing::warn!(error = %e, "failed to serialize user for persistence"),
            }
        }
    }

    /// Remove all three keys.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove persisted session key");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read persisted session key");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set(key, value) {
            tracing::warn!(key, error = %e, "failed to write persisted session key");
        }
    }
}

/// Structural validity check: a JWT-shaped string is three non-empty
/// dot-separated segments. Any other format is invalid.
#[must_use]
pub fn is_jwt_shaped(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|segment| !segment.is_empty())
}

// =============================================================================
// FILE BACKEND
// =============================================================================

/// One file per key under a directory. Keys are already prefixed and
/// filesystem-safe.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct read, bypassing the store semantics. Used by tests to assert
    /// on raw persisted values.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    /// Direct write, bypassing the store semantics. Used by tests to plant
    /// corrupt values.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
