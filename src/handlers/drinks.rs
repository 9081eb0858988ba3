//! Drink menu handlers.
//!
//! Implements the drinks CRUD surface:
//!
//! - `GET /drinks` - public summary list
//! - `GET /drinks-detail` - full recipes (requires `get:drinks-detail`)
//! - `POST /drinks` - create (requires `post:drinks`)
//! - `PATCH /drinks/{id}` - partial update (requires `patch:drinks`)
//! - `DELETE /drinks/{id}` - delete (requires `delete:drinks`)
//!
//! Token validation happens in the route middleware; each protected handler
//! enforces its own permission on the injected claims before doing any
//! work.

use crate::auth::Claims;
use crate::errors::ApiError;
use crate::models::{
    CreateDrinkRequest, DeleteDrinkResponse, Drink, DrinkDetail, DrinkSummary, DrinksResponse,
    RecipePayload, UpdateDrinkRequest,
};
use crate::repositories::DrinksRepository;
use crate::routes::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

/// Permission required to read full recipes.
const PERMISSION_READ_DETAIL: &str = "get:drinks-detail";

/// Permission required to create drinks.
const PERMISSION_CREATE: &str = "post:drinks";

/// Permission required to update drinks.
const PERMISSION_UPDATE: &str = "patch:drinks";

/// Permission required to delete drinks.
const PERMISSION_DELETE: &str = "delete:drinks";

// ============================================================================
// Handler: GET /drinks
// ============================================================================

/// Handler for GET /drinks.
///
/// Public endpoint: every drink in summary form (ingredient names
/// withheld).
#[instrument(skip_all, name = "drinks.handlers.list")]
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksResponse<DrinkSummary>>, ApiError> {
    let drinks = DrinksRepository::list(&state.pool).await?;

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::summary).collect(),
    )))
}

// ============================================================================
// Handler: GET /drinks-detail
// ============================================================================

/// Handler for GET /drinks-detail.
///
/// Every drink in detail form, for callers holding `get:drinks-detail`.
#[instrument(skip_all, name = "drinks.handlers.list_detail")]
pub async fn list_drinks_detail(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    claims.require_permission(PERMISSION_READ_DETAIL)?;

    let drinks = DrinksRepository::list(&state.pool).await?;

    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::detail).collect(),
    )))
}

// ============================================================================
// Handler: POST /drinks
// ============================================================================

/// Handler for POST /drinks.
///
/// # Response
///
/// - 200 OK: created drink, detail form, as a one-element list
/// - 400 Bad Request: missing or malformed body fields
/// - 403 Forbidden: caller lacks `post:drinks`
/// - 409 Conflict: title already in use
/// - 422 Unprocessable: insert failed
#[instrument(skip_all, name = "drinks.handlers.create")]
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    claims.require_permission(PERMISSION_CREATE)?;

    let Json(request) = payload.map_err(reject_body)?;
    let (title, recipe) = request
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if DrinksRepository::title_exists(&state.pool, &title, None).await? {
        return Err(ApiError::Conflict(format!(
            "drink titled {title:?} already exists"
        )));
    }

    let drink = DrinksRepository::insert(&state.pool, &title, &recipe).await?;

    info!(
        target: "drinks.handlers",
        drink_id = drink.drink_id,
        "Drink created"
    );

    Ok(Json(DrinksResponse::new(vec![drink.detail()])))
}

// ============================================================================
// Handler: PATCH /drinks/{id}
// ============================================================================

/// Handler for PATCH /drinks/{id}.
///
/// Only provided fields are applied. The title uniqueness check excludes
/// the drink being updated, so re-saving an unchanged title succeeds.
///
/// # Response
///
/// - 200 OK: updated drink, detail form, as a one-element list
/// - 400 Bad Request: malformed body, or no fields provided
/// - 403 Forbidden: caller lacks `patch:drinks`
/// - 404 Not Found: unknown id
/// - 409 Conflict: title belongs to a different drink
/// - 422 Unprocessable: update failed
#[instrument(skip_all, name = "drinks.handlers.update")]
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, ApiError> {
    claims.require_permission(PERMISSION_UPDATE)?;

    let Path(drink_id) = path.map_err(reject_path)?;

    let Json(request) = payload.map_err(reject_body)?;
    if !request.has_changes() {
        return Err(ApiError::BadRequest("no changes provided".to_string()));
    }

    // 404 before conflict detection so unknown ids never report conflicts
    DrinksRepository::find_by_id(&state.pool, drink_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("drink {drink_id}")))?;

    if let Some(title) = request.title.as_deref() {
        if DrinksRepository::title_exists(&state.pool, title, Some(drink_id)).await? {
            return Err(ApiError::Conflict(format!(
                "drink titled {title:?} already exists"
            )));
        }
    }

    let recipe = request.recipe.map(RecipePayload::into_ingredients);
    let updated = DrinksRepository::update(
        &state.pool,
        drink_id,
        request.title.as_deref(),
        recipe.as_deref(),
    )
    .await?;

    info!(
        target: "drinks.handlers",
        drink_id = updated.drink_id,
        "Drink updated"
    );

    Ok(Json(DrinksResponse::new(vec![updated.detail()])))
}

// ============================================================================
// Handler: DELETE /drinks/{id}
// ============================================================================

/// Handler for DELETE /drinks/{id}.
///
/// # Response
///
/// - 200 OK: `{success, delete: id}`
/// - 403 Forbidden: caller lacks `delete:drinks`
/// - 404 Not Found: unknown id
/// - 422 Unprocessable: delete failed
#[instrument(skip_all, name = "drinks.handlers.delete")]
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    claims.require_permission(PERMISSION_DELETE)?;

    let Path(drink_id) = path.map_err(reject_path)?;

    let deleted = DrinksRepository::delete(&state.pool, drink_id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("drink {drink_id}")));
    }

    info!(target: "drinks.handlers", drink_id, "Drink deleted");

    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: drink_id,
    }))
}

// ============================================================================
// Rejection mapping
// ============================================================================

/// Map a body deserialization rejection to the 400 envelope.
fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// Map a path deserialization rejection to the 404 envelope: a non-numeric
/// id matches no drink.
fn reject_path(rejection: PathRejection) -> ApiError {
    ApiError::NotFound(rejection.body_text())
}
