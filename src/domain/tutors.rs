//! Tutor (guardian) records and the `/v1/tutores` surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pets::Pet;
use crate::domain::Page;
use crate::error::ApiError;
use crate::http::client::ApiClient;

const TUTORS_PATH: &str = "/v1/tutores";

/// Canonical tutor record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// Payload for create/update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

/// `/v1/tutores` operations.
pub struct TutorsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TutorsApi<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: u32, page_size: u32) -> Result<Page<Tutor>, ApiError> {
        self.client
            .get_json(&format!("{TUTORS_PATH}?page={page}&pageSize={page_size}"))
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Tutor, ApiError> {
        self.client.get_json(&format!("{TUTORS_PATH}/{id}")).await
    }

    pub async fn create(&self, input: &TutorInput) -> Result<Tutor, ApiError> {
        self.client.post_json(TUTORS_PATH, input).await
    }

    pub async fn update(&self, id: Uuid, input: &TutorInput) -> Result<Tutor, ApiError> {
        self.client.put_json(&format!("{TUTORS_PATH}/{id}"), input).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete(&format!("{TUTORS_PATH}/{id}")).await?;
        Ok(())
    }

    /// Pets currently linked to this tutor.
    pub async fn pets(&self, id: Uuid) -> Result<Vec<Pet>, ApiError> {
        self.client.get_json(&format!("{TUTORS_PATH}/{id}/pets")).await
    }
}

#[cfg(test)]
#[path = "tutors_test.rs"]
mod tests;
