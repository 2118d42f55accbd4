//! API error types.
//!
//! One variant per user-visible rejection, so every failure mode in
//! the upload/read paths has a distinct message and status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced to API clients as `{ "message": ... }` JSON bodies.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Only JSON files are allowed")]
    NotJson,

    #[error("Invalid JSON file")]
    MalformedJson,

    #[error("Invalid vCon file structure")]
    InvalidVcon,

    #[error("File exceeds the {0} byte upload limit")]
    TooLarge(usize),

    #[error("Failed to read uploaded file")]
    UploadRead,

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::NotJson
            | ApiError::MalformedJson
            | ApiError::InvalidVcon
            | ApiError::UploadRead => StatusCode::BAD_REQUEST,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!("request rejected: {}", self);

        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}
