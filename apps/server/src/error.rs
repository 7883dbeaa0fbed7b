//! API error type and the uniform response envelope.
//!
//! Every response body has the same shape:
//! - success: `{"success": true,  "message": ..., "data": ...}`
//! - failure: `{"success": false, "message": ..., "error": ...}`
//!
//! Business failures keep their cashier-facing message and get a stable
//! `error` code the terminal can branch on. Storage and internal failures
//! are logged server-side and answered with a generic 500; their detail
//! never reaches a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use kasir_core::CoreError;
use kasir_db::{DbError, EngineError};

// =============================================================================
// API Error
// =============================================================================

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A business rule rejected the request. Message and code are
    /// cashier-facing.
    #[error("{message}")]
    Business {
        status: StatusCode,
        message: String,
        code: &'static str,
    },

    /// Malformed request input (bad query parameter, unparsable body).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Storage or other internal failure. Detail is already logged.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Stable machine-readable code for a business failure.
    fn core_code(err: &CoreError) -> &'static str {
        match err {
            CoreError::EmptyCart => "EmptyCart",
            CoreError::InvalidItemData(_) => "InvalidItemData",
            CoreError::MissingPayment => "MissingPayment",
            CoreError::ProductNotFound(_) => "ProductNotFound",
            CoreError::InsufficientStock { .. } => "InsufficientStock",
            CoreError::InsufficientPayment { .. } => "InsufficientPayment",
            CoreError::SaleNotFound(_) => "SaleNotFound",
            CoreError::AlreadyCancelled(_) => "AlreadyCancelled",
            CoreError::Validation(_) => "ValidationError",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        // A missing sale is the one business failure that is a 404
        let status = match err {
            CoreError::SaleNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError::Business {
            status,
            message: err.to_string(),
            code: ApiError::core_code(&err),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        error!(%err, "Database error");
        ApiError::Internal
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Business(core) => core.into(),
            EngineError::Db(db) => db.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            ApiError::Business {
                status,
                message,
                code,
            } => (status, message, code),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, "BadRequest"),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, message, "Unauthorized")
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, "NotFound"),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "Internal",
            ),
        };

        let body = json!({
            "success": false,
            "message": message,
            "error": code,
        });

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Success Envelope
// =============================================================================

/// 200 envelope.
pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::OK, message, data)
}

/// 201 envelope, for resource creation.
pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::CREATED, message, data)
}

fn envelope<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = json!({
        "success": true,
        "message": message,
        "data": data,
    });
    (status, Json(body)).into_response()
}

// =============================================================================
// Unit Tests
// =============================================================================
