//! Error type for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{AccessError, response::ApiResponse};
use thiserror::Error;
use tracing::error;

/// Authentication service error
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, invalid or unusable credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not permitted
    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<AccessError> for AuthError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated(message) => AuthError::Unauthorized(message),
            AccessError::RoleNotFound(_) => AuthError::Unauthorized("Role not found".to_string()),
            AccessError::InsufficientPermissions | AccessError::OutOfScope(_) => {
                AuthError::Forbidden
            }
            AccessError::NoEditableFields | AccessError::Validation(_) => {
                AuthError::BadRequest(err.to_string())
            }
            AccessError::Storage(e) => AuthError::Internal(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Internal(e) => {
                error!("Internal error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
