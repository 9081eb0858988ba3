//! Service configuration.
//!
//! Configuration is loaded from environment variables. The database URL is
//! redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Well-known JWKS document path published by the identity provider.
pub const JWKS_WELL_KNOWN_PATH: &str = ".well-known/jwks.json";

/// Drinks service configuration.
///
/// The JWKS URL and expected token issuer are derived from `AUTH_DOMAIN`
/// unless overridden explicitly via `AUTH_JWKS_URL` / `AUTH_ISSUER`.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// URL of the identity provider's JWKS endpoint.
    pub jwks_url: String,

    /// Expected `iss` claim on access tokens.
    pub issuer: String,

    /// Expected `aud` claim on access tokens.
    pub audience: String,
}

/// Custom Debug implementation that redacts the database URL.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwks_url", &self.jwks_url)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid auth configuration: {0}")]
    InvalidAuth(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let audience = vars
            .get("AUTH_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_AUDIENCE".to_string()))?
            .clone();

        if audience.is_empty() {
            return Err(ConfigError::InvalidAuth(
                "AUTH_AUDIENCE must not be empty".to_string(),
            ));
        }

        let domain = vars.get("AUTH_DOMAIN");

        let jwks_url = match (vars.get("AUTH_JWKS_URL"), domain) {
            (Some(url), _) => url.clone(),
            (None, Some(domain)) => format!("https://{domain}/{JWKS_WELL_KNOWN_PATH}"),
            (None, None) => {
                return Err(ConfigError::InvalidAuth(
                    "AUTH_DOMAIN or AUTH_JWKS_URL must be set".to_string(),
                ))
            }
        };

        let issuer = match (vars.get("AUTH_ISSUER"), domain) {
            (Some(issuer), _) => issuer.clone(),
            (None, Some(domain)) => format!("https://{domain}/"),
            (None, None) => {
                return Err(ConfigError::InvalidAuth(
                    "AUTH_DOMAIN or AUTH_ISSUER must be set".to_string(),
                ))
            }
        };

        Ok(Config {
            database_url,
            bind_address,
            jwks_url,
            issuer,
            audience,
        })
    }
}
