//! JWKS client for fetching signing keys from the identity provider.
//!
//! Keys are fetched from the provider's `/.well-known/jwks.json` endpoint on
//! every validation. There is no cache, TTL, or retry: key rotation takes
//! effect immediately, and a provider outage fails the request instead of
//! serving stale keys.

use crate::errors::ApiError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// Timeout for JWKS endpoint requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON Web Key as published by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for RS256 signing keys).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,
}

/// JWKS document returned by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Client for the identity provider's JWKS endpoint.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,
}

impl JwksClient {
    /// Create a new JWKS client.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the identity provider's JWKS endpoint
    pub fn new(jwks_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "drinks.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
        }
    }

    /// Fetch the key set and return the key matching `kid`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ServiceUnavailable` if the key set cannot be
    /// fetched or parsed. Returns `ApiError::BadRequest` if no key matches.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, ApiError> {
        let jwks = self.fetch_keys().await?;

        let Some(key) = jwks.keys.into_iter().find(|key| key.kid == kid) else {
            tracing::warn!(target: "drinks.auth.jwks", kid = %kid, "No matching key in JWKS");
            return Err(ApiError::BadRequest("no matching signing key".to_string()));
        };

        tracing::debug!(target: "drinks.auth.jwks", kid = %kid, "Signing key resolved");
        Ok(key)
    }

    /// Fetch the JWKS document from the identity provider.
    async fn fetch_keys(&self) -> Result<JwksResponse, ApiError> {
        tracing::debug!(target: "drinks.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "drinks.auth.jwks", error = %e, "Failed to fetch JWKS");
                ApiError::ServiceUnavailable("identity provider unreachable".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "drinks.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(ApiError::ServiceUnavailable(
                "JWKS endpoint returned an error".to_string(),
            ));
        }

        response.json().await.map_err(|e| {
            tracing::error!(target: "drinks.auth.jwks", error = %e, "Failed to parse JWKS response");
            ApiError::ServiceUnavailable("invalid JWKS response".to_string())
        })
    }
}
