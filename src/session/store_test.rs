use std::sync::Arc;

use super::*;
use crate::session::state::test_helpers::{dummy_tokens, dummy_user};
use crate::session::state::TokenPair;

fn memory_store() -> (SessionStore, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    (SessionStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>), backend)
}

// =============================================================================
// JWT SHAPE CHECK
// =============================================================================

#[test]
fn jwt_shaped_accepts_three_segments() {
    assert!(is_jwt_shaped("header.payload.signature"));
    assert!(is_jwt_shaped("a.b.c"));
}

#[test]
fn jwt_shaped_rejects_other_forms() {
    assert!(!is_jwt_shaped(""));
    assert!(!is_jwt_shaped("opaque-token"));
    assert!(!is_jwt_shaped("a.b"));
    assert!(!is_jwt_shaped("a.b.c.d"));
    assert!(!is_jwt_shaped("a..c"));
    assert!(!is_jwt_shaped(".b.c"));
    assert!(!is_jwt_shaped("a.b."));
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[test]
fn save_then_load_round_trips() {
    let (store, _) = memory_store();
    store.save(&dummy_tokens(), Some(&dummy_user()));
    let record = store.load().expect("record survives reload");
    assert_eq!(record.tokens, dummy_tokens());
    assert_eq!(record.user.unwrap().email.as_deref(), Some("ada@example.com"));
}

#[test]
fn load_from_empty_backend_is_none() {
    let (store, _) = memory_store();
    assert!(store.load().is_none());
}

#[test]
fn save_without_user_preserves_stored_user() {
    let (store, _) = memory_store();
    store.save(&dummy_tokens(), Some(&dummy_user()));
    store.save(&TokenPair::new("xxx.yyy.zzz", "qqq.rrr.sss"), None);
    let record = store.load().unwrap();
    assert_eq!(record.tokens.access_token, "xxx.yyy.zzz");
    assert_eq!(record.user.unwrap().id, "u-1", "omitting the user must not erase it");
}

#[test]
fn clear_removes_all_keys() {
    let (store, backend) = memory_store();
    store.save(&dummy_tokens(), Some(&dummy_user()));
    store.clear();
    assert!(backend.raw(store.access_token_key()).is_none());
    assert!(backend.raw(store.refresh_token_key()).is_none());
    assert!(backend.raw(store.user_key()).is_none());
}

// =============================================================================
// CORRUPTION HANDLING
// =============================================================================

#[test]
fn corrupt_access_token_discards_everything() {
    let (store, backend) = memory_store();
    store.save(&dummy_tokens(), Some(&dummy_user()));
    backend.put_raw(store.access_token_key(), "not-a-jwt");
    assert!(store.load().is_none());
    assert!(backend.raw(store.refresh_token_key()).is_none(), "all three keys cleared");
    assert!(backend.raw(store.user_key()).is_none());
}

#[test]
fn missing_refresh_token_discards_everything() {
    let (store, backend) = memory_store();
    backend.put_raw(store.access_token_key(), "aaa.bbb.ccc");
    assert!(store.load().is_none());
    assert!(backend.raw(store.access_token_key()).is_none());
}

#[test]
fn unparsable_user_degrades_to_none_but_tokens_survive() {
    let (store, backend) = memory_store();
    store.save(&dummy_tokens(), Some(&dummy_user()));
    backend.put_raw(store.user_key(), "{not json");
    let record = store.load().expect("valid tokens are still trusted");
    assert_eq!(record.tokens, dummy_tokens());
    assert!(record.user.is_none());
}

// =============================================================================
// FILE BACKEND
// =============================================================================

fn scratch_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("patinhas-store-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn file_backend_round_trips() {
    let dir = scratch_dir();
    let store = SessionStore::new(Arc::new(FileBackend::new(&dir)));
    store.save(&dummy_tokens(), Some(&dummy_user()));

    // A fresh store over the same directory simulates a process restart.
    let reopened = SessionStore::new(Arc::new(FileBackend::new(&dir)));
    let record = reopened.load().expect("record survives restart");
    assert_eq!(record.tokens, dummy_tokens());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn file_backend_missing_key_reads_none() {
    let dir = scratch_dir();
    let backend = FileBackend::new(&dir);
    assert!(backend.get("patinhas.access_token").unwrap().is_none());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn file_backend_remove_is_idempotent() {
    let dir = scratch_dir();
    let backend = FileBackend::new(&dir);
    backend.set("patinhas.user", "{}").unwrap();
    backend.remove("patinhas.user").unwrap();
    backend.remove("patinhas.user").unwrap();
    std::fs::remove_dir_all(&dir).ok();
}
