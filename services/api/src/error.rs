//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{AccessError, HierarchyError, response::ApiResponse};
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// No or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Internal server error, logged and never shown to the client
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// Wrap a storage failure with the message shown to the client
    pub fn internal(context: &str) -> impl FnOnce(anyhow::Error) -> ApiError + '_ {
        move |source| ApiError::Internal {
            context: context.to_string(),
            source,
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated(message) => ApiError::Unauthorized(message),
            AccessError::RoleNotFound(_) => ApiError::Unauthorized(err.to_string()),
            AccessError::InsufficientPermissions | AccessError::OutOfScope(_) => {
                ApiError::Forbidden(err.to_string())
            }
            AccessError::NoEditableFields | AccessError::Validation(_) => {
                ApiError::BadRequest(err.to_string())
            }
            AccessError::Storage(source) => ApiError::Internal {
                context: "Internal server error".to_string(),
                source,
            },
        }
    }
}

impl From<HierarchyError> for ApiError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::ManagerCycle(_) => ApiError::BadRequest(err.to_string()),
            HierarchyError::Storage(source) => ApiError::Internal {
                context: "Internal server error".to_string(),
                source,
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(source: anyhow::Error) -> Self {
        ApiError::Internal {
            context: "Internal server error".to_string(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { context, source } => {
                error!("{}: {:?}", context, source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
