use std::sync::Arc;

use super::*;
use crate::http::report::test_helpers::RecordingNotifier;
use crate::http::report::Notifier;
use crate::http::transport::test_helpers::*;
use crate::http::transport::{ApiRequest, HttpTransport, RawResponse, TransportError};
use crate::session::auth::test_helpers::RecordingNavigator;
use crate::session::auth::Navigator;
use crate::session::state::SessionManager;
use crate::session::store::{MemoryBackend, SessionStore};

fn client(
    handler: impl Fn(&ApiRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
) -> (ApiClient, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new(handler));
    let session = SessionManager::new(Arc::new(SessionStore::new(Arc::new(MemoryBackend::new()))));
    let client = ApiClient::new(
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
        session,
        Arc::new(RecordingNavigator::new()) as Arc<dyn Navigator>,
        Arc::new(RecordingNotifier::new()) as Arc<dyn Notifier>,
    );
    (client, transport)
}

// =============================================================================
// PHOTO NORMALIZATION
// =============================================================================

#[test]
fn current_photo_field_deserializes() {
    let json = r#"{"id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Rex","photo":{"url":"https://cdn/x.jpg"}}"#;
    let pet: Pet = serde_json::from_str(json).unwrap();
    assert_eq!(pet.photo.unwrap().url, "https://cdn/x.jpg");
}

#[test]
fn legacy_foto_field_is_normalized() {
    let json = r#"{"id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Rex","foto":{"url":"https://cdn/y.jpg"}}"#;
    let pet: Pet = serde_json::from_str(json).unwrap();
    assert_eq!(pet.photo.unwrap().url, "https://cdn/y.jpg");
}

#[test]
fn current_field_wins_when_both_present() {
    let json = r#"{
        "id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Rex",
        "photo":{"url":"new"},"foto":{"url":"old"}
    }"#;
    let pet: Pet = serde_json::from_str(json).unwrap();
    assert_eq!(pet.photo.unwrap().url, "new");
}

#[test]
fn absent_photo_stays_none() {
    let json = r#"{"id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Rex"}"#;
    let pet: Pet = serde_json::from_str(json).unwrap();
    assert!(pet.photo.is_none());
}

// =============================================================================
// API SURFACE
// =============================================================================

#[tokio::test]
async fn list_builds_pagination_query() {
    let (client, transport) = client(|_| {
        ok_json(serde_json::json!({
            "items": [{"id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Rex"}],
            "page": 2, "pageSize": 10, "total": 31,
        }))
    });

    let page = PetsApi::new(&client).list(2, 10).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page, 2);
    assert_eq!(transport.calls()[0].path, "/v1/pets?page=2&pageSize=10");
}

#[tokio::test]
async fn link_tutor_posts_to_the_nested_route() {
    let (client, transport) = client(|_| status_only(204));
    let pet_id: Uuid = "5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a".parse().unwrap();
    let tutor_id: Uuid = "0d5ef9c3-90f0-4f7d-9ee5-29b2f8b3a6d4".parse().unwrap();

    PetsApi::new(&client).link_tutor(pet_id, tutor_id).await.unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.method, reqwest::Method::POST);
    assert_eq!(call.path, format!("/v1/pets/{pet_id}/tutores/{tutor_id}"));
}

#[tokio::test]
async fn delete_returns_unit_on_success() {
    let (client, _) = client(|_| status_only(204));
    let id: Uuid = "5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a".parse().unwrap();
    PetsApi::new(&client).delete(id).await.unwrap();
}

#[tokio::test]
async fn create_posts_to_the_collection() {
    let (client, transport) = client(|_| {
        ok_json(serde_json::json!({"id":"5e3c5a2e-53a5-4b69-a3a2-48b9736c5b0a","name":"Mimi"}))
    });
    let input = PetInput { name: "Mimi".into(), species: None, breed: None, age: Some(3) };
    let pet = PetsApi::new(&client).create(&input).await.unwrap();
    assert_eq!(pet.name, "Mimi");
    assert_eq!(transport.calls()[0].path, "/v1/pets");
}

#[test]
fn input_skips_absent_optionals() {
    let input = PetInput { name: "Mimi".into(), species: None, breed: None, age: Some(3) };
    let body = serde_json::to_value(&input).unwrap();
    assert!(body.get("species").is_none(), "absent optionals are omitted from the body");
    assert_eq!(body["age"], 3);
}
