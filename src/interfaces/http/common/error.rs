//! Domain error → HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

pub const SIGN_IN_REQUIRED: &str = "You need to be signed in";
pub const NOT_ALLOWED: &str = "You are not allowed to view this part of the application";

/// Error returned by handlers; renders as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn forbidden() -> Self {
        Self(DomainError::Forbidden(NOT_ALLOWED.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound { .. } | DomainError::Missing(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) | DomainError::CapacityExceeded { .. } => {
                StatusCode::FORBIDDEN
            }
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message without the variant prefix.
    pub fn message(&self) -> String {
        match &self.0 {
            DomainError::Missing(m)
            | DomainError::Validation(m)
            | DomainError::Conflict(m)
            | DomainError::Unauthorized(m)
            | DomainError::Forbidden(m) => m.clone(),
            DomainError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.message()))).into_response()
    }
}
