//! Health check handler.

use crate::errors::ApiError;
use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Health check handler.
///
/// Pings the database to verify connectivity and returns the service
/// status. Reports unhealthy instead of erroring: probes need to see the
/// response.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "healthy"
/// }
/// ```
#[instrument(skip_all, name = "drinks.health.check")]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    let status = if db_healthy { "healthy" } else { "unhealthy" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        database: status.to_string(),
    }))
}
