//! Stateless HTTP request builder and response parser for one REST
//! collection.
//!
//! # Design
//! `ResourceClient` holds only the collection URL and carries no mutable
//! state between calls. Each CRUD operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The host's transport executes the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::EntityId;

/// Path prefix under which every collection is served.
pub const API_PREFIX: &str = "/api";

/// Synchronous, stateless client for `{base_url}/api/{resource}`.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    collection_url: String,
}

impl ResourceClient {
    pub fn new(base_url: &str, resource: &str) -> Self {
        Self {
            collection_url: format!(
                "{}{API_PREFIX}/{}",
                base_url.trim_end_matches('/'),
                resource.trim_matches('/')
            ),
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: EntityId) -> String {
        format!("{}/{id}", self.collection_url)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create<D: Serialize>(&self, draft: &D) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url.clone(),
            headers: json_headers(),
            body: Some(to_json(draft)?),
        })
    }

    pub fn build_update<D: Serialize>(
        &self,
        id: EntityId,
        draft: &D,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(to_json(draft)?),
        })
    }

    pub fn build_delete(&self, id: EntityId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list<E: DeserializeOwned>(&self, response: HttpResponse) -> Result<Vec<E>, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Accepts any 2xx. The body is not inspected: servers answer a create
    /// either with the new entity or with an acknowledgement envelope, and
    /// the controller reloads the collection afterwards anyway.
    pub fn parse_create(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<D: Serialize>(draft: &D) -> Result<String, ApiError> {
    serde_json::to_string(draft).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body.clone(),
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
