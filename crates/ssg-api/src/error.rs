//! Domain error to HTTP response mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use ssg_core::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Template error: {0}")]
    Template(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Domain(e) => match e {
                DomainError::Unauthenticated | DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized")
                }
                DomainError::WeakPassword(_)
                | DomainError::PasswordMismatch
                | DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
                DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
                DomainError::UserNotFound
                | DomainError::SessionNotFound
                | DomainError::PostNotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
                DomainError::DuplicateUsername(_) | DomainError::PostAlreadyExists(_) => {
                    (StatusCode::CONFLICT, "Conflict")
                }
                DomainError::StoreUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "StoreUnavailable")
                }
                DomainError::PasswordHash(_)
                | DomainError::TokenGeneration(_)
                | DomainError::Host(_)
                | DomainError::Render(_)
                | DomainError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Template(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.parts();

        let message = if status.is_server_error() {
            tracing::error!("{}: {}", error_type, self);
            // internals stay in the log
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            tracing::warn!("{}: {}", error_type, self);
            match &self {
                ApiError::Domain(DomainError::Unauthenticated) => "please sign in".to_string(),
                other => other.to_string(),
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
