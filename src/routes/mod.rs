//! HTTP routes for the drinks service.
//!
//! Defines the Axum router and application state.

use crate::auth::{JwksClient, JwtValidator};
use crate::config::Config;
use crate::handlers;
use crate::middleware::{require_auth, AuthState};
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Health check endpoint (public)
/// - `/drinks` GET - Public summary list
/// - `/drinks-detail` GET, `/drinks` POST, `/drinks/{id}` PATCH/DELETE -
///   Bearer token required; permissions checked per handler
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>) -> Router {
    // JWKS client and JWT validator from auth configuration
    let jwks_client = Arc::new(JwksClient::new(state.config.jwks_url.clone()));
    let jwt_validator = Arc::new(JwtValidator::new(
        jwks_client,
        state.config.audience.clone(),
        state.config.issuer.clone(),
    ));
    let auth_state = Arc::new(AuthState { jwt_validator });

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/drinks", get(handlers::list_drinks))
        .with_state(state.clone());

    // Protected routes (valid bearer token required)
    let protected_routes = Router::new()
        .route("/drinks-detail", get(handlers::list_drinks_detail))
        .route("/drinks", post(handlers::create_drink))
        .route("/drinks/:drink_id", patch(handlers::update_drink))
        .route("/drinks/:drink_id", delete(handlers::delete_drink))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // AppState must implement Clone for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
