//! Response envelopes and API errors.
//!
//! # Design Decisions
//! - Successful bodies use `{"data": ...}` with optional `{"meta": ...}`
//! - Errors use `{"errors": [{"status", "title", "detail"}]}`
//! - Database failures never leak their message to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::example::repository::RepoError;
use crate::example::service::ServiceError;

/// `{"data": ...}` body with an optional `meta` object.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self { meta: None, data }
    }

    pub fn with_meta(data: T, meta: Value) -> Self {
        Self { meta: Some(meta), data }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal,

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(msg) => ApiError::BadRequest(msg),
            ServiceError::Repo(RepoError::NotFound(id)) => {
                ApiError::NotFound(format!("example {} not found", id))
            }
            ServiceError::Repo(e @ RepoError::InvalidSort(_)) => ApiError::BadRequest(e.to_string()),
            ServiceError::Repo(RepoError::Database(_)) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "errors": [{
                "status": status.as_u16(),
                "title": status.canonical_reason().unwrap_or("Error"),
                "detail": self.to_string(),
            }]
        });
        (status, Json(body)).into_response()
    }
}
