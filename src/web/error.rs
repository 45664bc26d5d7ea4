use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::db::services::SnippetError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UserAlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "Invalid credentials.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials.".to_string()),
            AppError::PasswordHashingError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Password hashing error: {msg}"),
            ),
            AppError::TokenCreationError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Token creation error: {msg}"),
            ),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request.");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {msg}"))
            }
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl AppError {
    /// Same response for foreign, missing and unparseable snippet ids.
    pub fn snippet_not_found() -> Self {
        AppError::NotFound("Snippet not found or you don't have permission to access it.".to_string())
    }

    pub fn tag_not_found() -> Self {
        AppError::NotFound("Tag not found.".to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<SnippetError> for AppError {
    fn from(err: SnippetError) -> Self {
        match err {
            SnippetError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            SnippetError::NotFound(_) => AppError::snippet_not_found(),
            SnippetError::TagNotFound(_) => AppError::tag_not_found(),
            SnippetError::Validation(msg) => AppError::InvalidInput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_snippet_errors_map_to_status_codes() {
        let (status, body) =
            status_and_body(SnippetError::Validation("No snippet IDs provided.".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No snippet IDs provided.");

        let (status, _) = status_and_body(SnippetError::TagNotFound(3).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = status_and_body(
            SnippetError::DbErr(sea_orm::DbErr::Custom("boom".into())).into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_not_found_does_not_leak_the_id() {
        let (_, a) = status_and_body(SnippetError::NotFound(1).into()).await;
        let (_, b) = status_and_body(SnippetError::NotFound(999).into()).await;
        assert_eq!(a, b);
    }
}
