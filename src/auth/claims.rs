//! JWT claims structure.
//!
//! Contains the claims extracted from validated tokens. The `sub` field is
//! redacted in Debug output to prevent exposure in logs.

use crate::errors::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims extracted from a validated access token.
///
/// The `sub` field contains user or client identifiers which should not
/// be exposed in logs. A custom Debug implementation redacts this field.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client identifier) - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Permissions granted to this token.
    ///
    /// `None` when the provider issued the token without any permissions
    /// claim; distinct from an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Claims {
    /// Check whether the token carries a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_deref()
            .is_some_and(|permissions| permissions.iter().any(|p| p == permission))
    }

    /// Enforce a required permission.
    ///
    /// A token without any permissions claim is a malformed credential
    /// (400); a token whose claim lacks `permission` is a forbidden caller
    /// (403).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` or `ApiError::Forbidden` as above.
    pub fn require_permission(&self, permission: &str) -> Result<(), ApiError> {
        let Some(permissions) = self.permissions.as_deref() else {
            tracing::debug!(target: "drinks.auth.claims", "Token has no permissions claim");
            return Err(ApiError::BadRequest(
                "token has no permissions claim".to_string(),
            ));
        };

        if !permissions.iter().any(|p| p == permission) {
            tracing::debug!(
                target: "drinks.auth.claims",
                permission = %permission,
                "Token lacks required permission"
            );
            return Err(ApiError::Forbidden(format!(
                "missing required permission {permission}"
            )));
        }

        Ok(())
    }
}
