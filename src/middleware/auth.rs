//! Authentication middleware for protected routes.
//!
//! Extracts the bearer token from the Authorization header, validates the
//! JWT against the identity provider's JWKS, and injects the claims into
//! request extensions for handlers. Permission checks happen per handler on
//! the injected claims.

use crate::auth::JwtValidator;
use crate::errors::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// JWT validator with JWKS client.
    pub jwt_validator: Arc<JwtValidator>,
}

/// Extract the bearer token from the Authorization header.
///
/// The header must consist of exactly two space-separated parts, and the
/// scheme comparison is case-insensitive:
///
/// ```text
/// Authorization: Bearer <token>
/// ```
fn extract_bearer_token(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "drinks.middleware.auth", "Missing Authorization header");
            ApiError::Unauthorized("missing Authorization header".to_string())
        })?;

    let mut parts = auth_header.split(' ');
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => {
            tracing::debug!(target: "drinks.middleware.auth", "Invalid Authorization header format");
            return Err(ApiError::Unauthorized(
                "invalid Authorization header format".to_string(),
            ));
        }
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::debug!(target: "drinks.middleware.auth", "Unsupported Authorization scheme");
        return Err(ApiError::Unauthorized(
            "unsupported Authorization scheme".to_string(),
        ));
    }

    Ok(token)
}

/// Authentication middleware that validates JWT tokens.
///
/// # Response
///
/// - Returns 401 Unauthorized if the header is missing or malformed or the
///   token fails verification (400/503 for the token-parse and
///   JWKS-availability failure classes)
/// - Continues to the next handler with `Claims` in request extensions if
///   the token is valid
#[instrument(skip_all, name = "drinks.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer_token(&req)?;

    let claims = state.jwt_validator.validate(token).await?;

    // Store claims in request extensions for downstream handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
