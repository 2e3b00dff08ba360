use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::error::ServiceError;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Error body format: `{ "error": { "code": "...", "message": "..." } }`.
#[derive(Debug)]
pub enum AppError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 404 Not Found
    NotFound(String),
    /// 413 Payload Too Large
    PayloadTooLarge(String),
    /// 422 Unprocessable Entity
    UnprocessableEntity(String),
    /// A domain error from the service layer
    Service(ServiceError),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg),
            Self::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg)
            }
            Self::Service(err) => classify_service_error(err),
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                internal()
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            })),
        )
            .into_response()
    }
}

fn classify_service_error(err: ServiceError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        ServiceError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
        ServiceError::UnresolvedReference { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "UNRESOLVED_REFERENCE",
            message,
        ),
        ServiceError::UnsupportedContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_CONTENT_TYPE",
            message,
        ),
        ServiceError::ContentTypeMismatch { .. } => {
            (StatusCode::BAD_REQUEST, "CONTENT_TYPE_MISMATCH", message)
        }
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
        ServiceError::NoTilemaps => (StatusCode::UNPROCESSABLE_ENTITY, "NO_TILEMAPS", message),
        ServiceError::Storage(db) => {
            tracing::error!("Storage error: {db}");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(format!("Multipart error: {}", err.body_text()))
        }
    }
}
