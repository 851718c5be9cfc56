//! API error types.
//!
//! Every failure a handler can produce is mapped to a stable machine code
//! plus a human-readable message:
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
//! ```
//!
//! ## Mapping
//! ```text
//! ValidationError / bad checkout input  → 400 VALIDATION_ERROR
//! unknown variant in a cart line        → 400 NOT_FOUND
//! stock cannot cover a line             → 400 INSUFFICIENT_STOCK
//! missing/invalid bearer token          → 401 UNAUTHORIZED
//! missing or foreign-owned resource     → 404 NOT_FOUND
//! storage failures                      → 500 DATABASE_ERROR (generic text)
//! everything else                       → 500 INTERNAL (generic text)
//! ```
//! Internal detail is logged server-side, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pharma_core::{CoreError, ValidationError};
use pharma_db::{DbError, StoreError};
use serde::Serialize;
use tracing::error;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    Unauthorized,
    DatabaseError,
    Internal,
}

/// An API-level error: HTTP status plus the serialized body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

/// The JSON body the client sees.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::UNAUTHORIZED,
            code: ErrorCode::Unauthorized,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            code: ErrorCode::NotFound,
            message: message.into(),
        }
    }

    /// Internal error with a generic client message; `detail` only hits
    /// the logs.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(%detail, "Internal error");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::Internal,
            message: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::ValidationError,
            message: err.to_string(),
        }
    }
}

/// Business-rule failures from checkout and order management.
/// All client-caused, all 4xx; messages are safe to forward.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            // A bad variant id in a cart is a malformed request, not a
            // missing API resource: 400, not 404.
            CoreError::VariantNotFound(_) => (StatusCode::BAD_REQUEST, ErrorCode::NotFound),
            CoreError::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::InsufficientStock)
            }
            CoreError::OrderNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            CoreError::InvalidStatusTransition { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError)
            }
        };
        ApiError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            other => {
                error!(%other, "Database error");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: ErrorCode::DatabaseError,
                    message: "Internal server error".to_string(),
                }
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => core.into(),
            StoreError::Db(db) => db.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
