//! Drinks service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl and are
//! rendered as the fixed JSON envelope `{success, error, message}`. The
//! client-facing message is a static string per status; the actual cause is
//! logged server-side only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Drinks service error type.
///
/// Maps to HTTP status codes:
/// - BadRequest: 400 (malformed body, missing permissions claim, unparsable token)
/// - Unauthorized: 401 (missing/malformed credentials, expired token, claim mismatch)
/// - Forbidden: 403 (authenticated caller lacking the required permission)
/// - NotFound: 404
/// - Conflict: 409 (duplicate title)
/// - Unprocessable: 422 (insert/update/delete failures, caught broadly)
/// - Database: 500 (read-path failures)
/// - ServiceUnavailable: 503 (JWKS endpoint unreachable)
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Static client-facing message for this error.
    ///
    /// The variant payload never reaches the client; it is logged instead.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "insufficient permission",
            ApiError::NotFound(_) => "resource not found",
            ApiError::Conflict(_) => "resource already exists",
            ApiError::Unprocessable(_) => "unprocessable",
            ApiError::Database(_) => "internal server error",
            ApiError::ServiceUnavailable(_) => "service unavailable",
        }
    }
}

/// Fixed error envelope returned for every failed request.
#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: u16,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log the real cause server-side; the client gets a static message
        match &self {
            ApiError::Database(detail) => {
                tracing::error!(target: "drinks.errors", error = %detail, "Database operation failed");
            }
            ApiError::Unprocessable(detail) => {
                tracing::error!(target: "drinks.errors", error = %detail, "Persistence operation failed");
            }
            ApiError::ServiceUnavailable(detail) => {
                tracing::warn!(target: "drinks.errors", reason = %detail, "Upstream dependency unavailable");
            }
            other => {
                tracing::debug!(target: "drinks.errors", error = %other, "Request rejected");
            }
        }

        let envelope = ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };

        let mut response = (status, Json(envelope)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) = "Bearer realm=\"drinks-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to ApiError (read paths).
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
