//! Shared HTTP response envelopes and extractors

pub mod error;
pub mod validated_json;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::ApiError;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Envelope for every JSON response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// List payload: `{"items": [...]}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

impl<T> ItemsResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Issued on login and registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
