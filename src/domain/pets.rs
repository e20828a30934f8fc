//! Pet records and the `/v1/pets` surface.
//!
//! The API historically served the pet photo under two different optional
//! field names (`photo` and the older `foto`). The wire shape accepts
//! both; everything past deserialization sees one canonical field.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Page;
use crate::error::ApiError;
use crate::http::client::ApiClient;

const PETS_PATH: &str = "/v1/pets";

/// Photo attachment on a pet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Canonical pet record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PetWire")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    /// Normalized from whichever legacy field the API populated.
    pub photo: Option<Photo>,
}

/// Wire shape: both photo spellings, normalized into [`Pet::photo`].
#[derive(Deserialize)]
struct PetWire {
    id: Uuid,
    name: String,
    #[serde(default)]
    species: Option<String>,
    #[serde(default)]
    breed: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    photo: Option<Photo>,
    #[serde(default)]
    foto: Option<Photo>,
}

impl From<PetWire> for Pet {
    fn from(wire: PetWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            species: wire.species,
            breed: wire.breed,
            age: wire.age,
            // The current field wins when both are present.
            photo: wire.photo.or(wire.foto),
        }
    }
}

/// Payload for create/update.
#[derive(Debug, Clone, Serialize)]
pub struct PetInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// `/v1/pets` operations.
pub struct PetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PetsApi<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, page_size: u32) -> Result<Page<Pet>, ApiError> {
        self.client
            .get_json(&format!("{PETS_PATH}?page={page}&pageSize={page_size}"))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Pet, ApiError> {
        self.client.get_json(&format!("{PETS_PATH}/{id}")).await
    }

    pub async fn create(&self, input: &PetInput) -> Result<Pet, ApiError> {
        self.client.post_json(PETS_PATH, input).await
    }

    pub async fn update(&self, id: Uuid, input: &PetInput) -> Result<Pet, ApiError> {
        self.client.put_json(&format!("{PETS_PATH}/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("{PETS_PATH}/{id}")).await?;
        Ok(())
    }

    /// Link a pet to its guardian.
    pub async fn link_tutor(&self, pet_id: Uuid, tutor_id: Uuid) -> Result<(), ApiError> {
        self.client
            .post(&format!("{PETS_PATH}/{pet_id}/tutores/{tutor_id}"), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    /// Remove the link between a pet and a guardian.
    pub async fn unlink_tutor(&self, pet_id: Uuid, tutor_id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("{PETS_PATH}/{pet_id}/tutores/{tutor_id}")).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pets_test.rs"]
mod tests;
