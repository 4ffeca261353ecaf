//! Server error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2102,
///     "message": "redemption code has expired",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`ApiError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation / auth | 400 / 401 / 403              |
/// | 2000–2099 | Not Found         | 404 Not Found                |
/// | 2100–2199 | State Conflict    | 409 Conflict / 410 Gone      |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No session could be established for the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The session's account type is not allowed to perform the operation.
    #[error("operation not permitted for this account type")]
    Forbidden,

    /// Deal with the given ID was not found (or not owned by the caller).
    #[error("deal not found: {0}")]
    DealNotFound(uuid::Uuid),

    /// The session owner has no business profile yet.
    #[error("business profile not found")]
    BusinessNotFound,

    /// No redemption matches the scanned code for this business.
    #[error("invalid redemption code")]
    CodeNotFound,

    /// Redemption with the given ID was not found for this business.
    #[error("redemption not found: {0}")]
    RedemptionNotFound(uuid::Uuid),

    /// The code was already consumed.
    #[error("redemption code has already been redeemed")]
    AlreadyRedeemed,

    /// The code's validity window has elapsed.
    #[error("redemption code has expired")]
    CodeExpired,

    /// The owner already has a business profile.
    #[error("a business already exists for this account")]
    BusinessAlreadyExists,

    /// The deal's redemption cap has been reached.
    #[error("deal has reached its redemption limit")]
    DealFullyRedeemed,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthenticated => 1002,
            Self::Forbidden => 1003,
            Self::DealNotFound(_) => 2001,
            Self::BusinessNotFound => 2002,
            Self::CodeNotFound => 2003,
            Self::RedemptionNotFound(_) => 2004,
            Self::AlreadyRedeemed => 2101,
            Self::CodeExpired => 2102,
            Self::BusinessAlreadyExists => 2103,
            Self::DealFullyRedeemed => 2104,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::DealNotFound(_)
            | Self::BusinessNotFound
            | Self::CodeNotFound
            | Self::RedemptionNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyRedeemed | Self::BusinessAlreadyExists | Self::DealFullyRedeemed => {
                StatusCode::CONFLICT
            }
            Self::CodeExpired => StatusCode::GONE,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
