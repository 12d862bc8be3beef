use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;

// Type alias for Result with our ApiError
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error taxonomy for every HTTP operation.
///
/// Each variant maps to exactly one status code and serializes as
/// `{"error": "<message>"}`. Conflicts deliberately answer 400 rather
/// than 409 so the frontend only distinguishes ok / client error /
/// auth error / server error.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// 401 with the canonical guard message.
    pub fn unauthenticated() -> Self {
        ApiError::Auth("Authentication required".to_string())
    }

    /// 403 with the canonical guard message.
    pub fn unauthorized() -> Self {
        ApiError::Forbidden("Unauthorized access".to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => ApiError::Database(e),
            RepositoryError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            RepositoryError::AlreadyExists => {
                ApiError::Conflict("Resource already exists".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Session(ref e) => {
                tracing::error!("Session error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Io(ref e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ApiError::Validation("All fields are required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_bad_request() {
        let response = ApiError::Conflict("Email already registered".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_maps_to_unauthorized() {
        let response = ApiError::unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_maps_to_forbidden() {
        let response = ApiError::unauthorized().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let response = ApiError::NotFound("Party not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_errors_convert() {
        let err: ApiError = RepositoryError::AlreadyExists.into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = RepositoryError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
