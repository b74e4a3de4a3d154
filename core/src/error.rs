//! Error types for the CRUD client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the entity does not exist" from "the server rejected the request." All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body. The remote may attach a human-readable `detail` to either; see
//! [`ApiError::user_message`].

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `ResourceClient` parse methods and by `Transport`s.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound { body: String },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, DNS, ...).
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// The `detail` the remote attached to its error body, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::NotFound { body } | ApiError::HttpError { body, .. } => {
                detail_from_body(body)
            }
            _ => None,
        }
    }

    /// Text shown to the user: the remote detail when present, otherwise a
    /// generic description of the failure.
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail;
        }
        match self {
            ApiError::NotFound { .. } => "Request failed with status code 404".to_string(),
            ApiError::HttpError { status, .. } => {
                format!("Request failed with status code {status}")
            }
            other => other.to_string(),
        }
    }
}

/// Pull `detail` out of a JSON error body.
///
/// A string detail is returned as-is. A list (validation errors) is reduced
/// to the `msg` of each entry joined with `"; "`.
fn detail_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => item.to_string(),
                })
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        other => Some(other.to_string()),
    }
}

/// Errors raised while loading or applying a `ViewConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("endpoint must not be empty")]
    EmptyEndpoint,

    #[error("`{0}` is not one of the configured sort options")]
    UnknownSortKey(String),
}
