//! API error types and error response payloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pricetree_store::StoreError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error detail carried in every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetail {
    /// Stable error code identifier.
    pub error_code: String,
    /// Human readable message.
    pub message: String,
}

/// Error response wrapper: `{"error": {"errorCode", "message"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Handler error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request was malformed or violates a field rule.
    #[error("{message}")]
    BadRequest { message: String },
    /// Sync payload refused before any write.
    #[error("{message}")]
    SyncRejected { message: String },
    /// A node for the same (vendor, root, category) already exists.
    #[error("{message}")]
    UniquenessViolation { message: String },
    /// Resource not found.
    #[error("{message}")]
    NotFound { message: String },
    /// A read did not finish within the request timeout.
    #[error("{message}")]
    Timeout { message: String },
    /// Internal error.
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn to_status_and_payload(&self) -> (StatusCode, ApiErrorResponse) {
        let (status, code, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
            Self::SyncRejected { message } => (StatusCode::UNPROCESSABLE_ENTITY, "SYNC_REJECTED", message),
            Self::UniquenessViolation { message } => (StatusCode::CONFLICT, "UNIQUENESS_VIOLATION", message),
            Self::NotFound { message } => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
            Self::Timeout { message } => (StatusCode::SERVICE_UNAVAILABLE, "REQUEST_TIMEOUT", message),
            Self::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message),
        };
        (
            status,
            ApiErrorResponse {
                error: ApiErrorDetail {
                    error_code: code.to_string(),
                    message: message.clone(),
                },
            },
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::SyncRejected(_) => Self::SyncRejected { message },
            StoreError::UniquenessViolation { .. } => Self::UniquenessViolation { message },
            StoreError::NodeNotFound { .. } => Self::NotFound { message },
            StoreError::PriceOnNonLeaf(_)
            | StoreError::InvalidCatalog(_)
            | StoreError::InvalidSheetRow(_)
            | StoreError::InvalidVendorId => Self::BadRequest { message },
            StoreError::Corrupt(_) | StoreError::Sled(_) | StoreError::Codec { .. } => {
                error!("Store failure: {}", message);
                Self::Internal { message }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = self.to_status_and_payload();
        (status, axum::Json(payload)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
