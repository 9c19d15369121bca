// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Global Application Error Enum.
/// Every failure of the feed subsystem is translated to one of these kinds
/// at the component boundary; callers never see raw transport or driver errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    // 401 Unauthorized
    #[error("session not found")]
    Unauthenticated,

    // 400 Bad Request
    #[error("{0}")]
    Validation(String),

    // 403 Forbidden
    #[error("{0}")]
    Permission(String),

    // 409 Conflict (e.g., a second like from the same user)
    #[error("{0}")]
    Duplicate(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 400 / 413, rejected by the media uploader
    #[error("{0}")]
    Upload(String),

    // 503 Service Unavailable
    #[error("temporarily unavailable: {0}")]
    Transient(String),
}

impl AppError {
    /// Stable machine-readable name, sent alongside the message in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::Validation(_) => "validation",
            AppError::Permission(_) => "permission",
            AppError::Duplicate(_) => "duplicate",
            AppError::NotFound(_) => "not_found",
            AppError::Upload(_) => "upload",
            AppError::Transient(_) => "transient",
        }
    }

    /// Rebuilds an error from the `kind` and message of an error body.
    pub fn from_kind(kind: &str, message: String) -> Self {
        match kind {
            "unauthenticated" => AppError::Unauthenticated,
            "validation" => AppError::Validation(message),
            "permission" => AppError::Permission(message),
            "duplicate" => AppError::Duplicate(message),
            "not_found" => AppError::NotFound(message),
            "upload" => AppError::Upload(message),
            _ => AppError::Transient(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Permission(_) => StatusCode::FORBIDDEN,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(msg) if msg.contains("exceeds") => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Transient(msg) => {
                tracing::error!("Transient failure: {}", msg);
                "Service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

/// Translates `sqlx::Error` at the store boundary.
/// Unique violations become `Duplicate`, FK violations `NotFound`, the rest `Transient`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => AppError::Duplicate(db.message().to_string()),
                Some("23503") => AppError::NotFound("Referenced record not found".to_string()),
                Some("23514") => AppError::Validation(db.message().to_string()),
                _ => AppError::Transient(err.to_string()),
            },
            _ => AppError::Transient(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transient(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_error_body() {
        let errors = [
            AppError::Unauthenticated,
            AppError::Validation("content must not be empty".into()),
            AppError::Permission("not the author".into()),
            AppError::Duplicate("already liked".into()),
            AppError::NotFound("post".into()),
            AppError::Upload("unsupported".into()),
            AppError::Transient("timeout".into()),
        ];
        for err in errors {
            let message = match &err {
                AppError::Unauthenticated => String::new(),
                other => other.to_string(),
            };
            let rebuilt = AppError::from_kind(err.kind(), message);
            assert_eq!(rebuilt.kind(), err.kind());
        }
    }

    #[test]
    fn unknown_kind_is_transient() {
        assert_eq!(
            AppError::from_kind("mystery", "x".into()),
            AppError::Transient("x".into())
        );
    }

    #[test]
    fn oversized_upload_maps_to_413() {
        let err = AppError::Upload("file exceeds 10485760 bytes".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }
}
