//! API error types with IntoResponse
//!
//! Errors are converted to `{"error": code, "message": text}` JSON bodies.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::{AuthError, JwtError, PasswordError};
use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Unparseable path or body (400)
    MalformedRequest(String),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Duplicate name or blocked delete (400)
    Conflict(String),

    /// Entities that may not be combined (400)
    InvalidArgument(String),

    /// Missing, bad, or insufficient credentials (401)
    Unauthorized(AuthError),

    /// Persistence failure (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },

    /// Request exceeded the server timeout (408)
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MalformedRequest(_)
            | Self::Conflict(_)
            | Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match self {
            Self::Validation(e) => ("validation_error", e.to_string()),
            Self::MalformedRequest(message) => ("validation_error", message),
            Self::NotFound { resource, id } => {
                ("not_found", format!("{} '{}' not found", resource, id))
            }
            Self::Conflict(message) => ("conflict", message),
            Self::InvalidArgument(message) => ("invalid_argument", message),
            Self::Unauthorized(e) => {
                tracing::warn!(reason = e.code(), "request unauthorized");
                (e.code(), e.message().to_owned())
            }
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("internal_error", e.to_string())
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ("internal_error", message)
            }
            Self::Timeout => ("request_timeout", "Request timed out.".to_owned()),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict(message) => Self::Conflict(message),
            DbError::InvalidArgument(message) => Self::InvalidArgument(message),
            DbError::Validation(e) => Self::Validation(e),
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Unauthorized(e)
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => Self::Unauthorized(AuthError::Expired),
            JwtError::Invalid => Self::Unauthorized(AuthError::InvalidToken),
            JwtError::Encoding(_) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::from(DbError::NotFound {
            resource: "tag",
            id: "3".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "tag '3' not found");
    }

    #[tokio::test]
    async fn conflict_is_400() {
        let err = ApiError::from(DbError::Conflict("taken".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn database_error_carries_cause() {
        let err = ApiError::from(DbError::Sqlx(sqlx::Error::RowNotFound));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert!(body["message"].as_str().unwrap().contains("no rows returned"));
    }

    #[tokio::test]
    async fn unauthorized_uses_auth_code() {
        let response = ApiError::from(AuthError::Revoked).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "token_revoked");
        assert_eq!(body["message"], "The token has been revoked.");
    }
}
