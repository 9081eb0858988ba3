//! JWT validation against the identity provider's JWKS.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted
//! - Signature, expiry, audience, and issuer are all verified
//! - Client-facing messages stay generic; detail goes to the log

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::ApiError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Oversized tokens are rejected before any base64 decoding or signature
/// work, bounding the resources an unauthenticated caller can consume.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// JWT validator using the identity provider's JWKS.
pub struct JwtValidator {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,

    /// Expected `aud` claim.
    audience: String,

    /// Expected `iss` claim.
    issuer: String,
}

impl JwtValidator {
    /// Create a new JWT validator.
    ///
    /// # Arguments
    ///
    /// * `jwks_client` - Client for fetching public keys
    /// * `audience` - Expected `aud` claim on tokens
    /// * `issuer` - Expected `iss` claim on tokens
    pub fn new(jwks_client: Arc<JwksClient>, audience: String, issuer: String) -> Self {
        Self {
            jwks_client,
            audience,
            issuer,
        }
    }

    /// Validate a JWT and return its claims.
    ///
    /// 1. Size check, then extract `kid` from the header
    /// 2. Fetch the matching public key from the JWKS
    /// 3. Verify the RS256 signature plus `exp`, `aud`, and `iss`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for expired tokens and
    /// audience/issuer mismatches, `ApiError::BadRequest` for unparsable
    /// tokens and unknown or unusable signing keys, and
    /// `ApiError::ServiceUnavailable` when the JWKS cannot be fetched.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let kid = extract_kid(token)?;
        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = verify_token(token, &jwk, &self.audience, &self.issuer)?;

        tracing::debug!(target: "drinks.auth.jwt", "Token validated successfully");
        Ok(claims)
    }
}

/// Extract the `kid` (key ID) from a JWT header without verifying the
/// signature.
///
/// The `kid` is only used to look up a key in the trusted JWKS; the token
/// MUST still be verified against that key afterwards.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for oversized, malformed, or kid-less
/// tokens.
pub fn extract_kid(token: &str) -> Result<String, ApiError> {
    // Check token size first (DoS prevention)
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "drinks.auth.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(ApiError::BadRequest("token exceeds size limit".to_string()));
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "drinks.auth.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(ApiError::BadRequest("malformed token".to_string()));
    }

    let header_part = parts
        .first()
        .ok_or_else(|| ApiError::BadRequest("malformed token".to_string()))?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "drinks.auth.jwt", error = %e, "Failed to decode JWT header base64");
        ApiError::BadRequest("malformed token".to_string())
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "drinks.auth.jwt", error = %e, "Failed to parse JWT header JSON");
        ApiError::BadRequest("malformed token".to_string())
    })?;

    // Extract kid as a non-empty string
    header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            tracing::debug!(target: "drinks.auth.jwt", "Token header has no usable kid");
            ApiError::BadRequest("token header has no kid".to_string())
        })
}

/// Verify the token signature and standard claims against an RSA JWK.
fn verify_token(
    token: &str,
    jwk: &Jwk,
    audience: &str,
    issuer: &str,
) -> Result<Claims, ApiError> {
    // Validate the JWK is an RS256 signing key
    if jwk.kty != "RSA" {
        tracing::warn!(target: "drinks.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(ApiError::BadRequest("unusable signing key".to_string()));
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "drinks.auth.jwt", alg = %alg, "Unexpected JWK algorithm");
            return Err(ApiError::BadRequest("unusable signing key".to_string()));
        }
    }

    let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
        tracing::error!(target: "drinks.auth.jwt", kid = %jwk.kid, "JWK missing RSA components");
        return Err(ApiError::BadRequest("unusable signing key".to_string()));
    };

    let decoding_key = DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "drinks.auth.jwt", error = %e, "Invalid RSA key components");
        ApiError::BadRequest("unusable signing key".to_string())
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "drinks.auth.jwt", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::Unauthorized("token expired".to_string()),
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => {
                ApiError::Unauthorized("audience or issuer mismatch".to_string())
            }
            _ => ApiError::BadRequest("unable to parse or verify token".to_string()),
        }
    })?;

    Ok(token_data.claims)
}
