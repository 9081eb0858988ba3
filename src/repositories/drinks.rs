//! Drinks repository for database operations.
//!
//! All queries use parameterized statements. The recipe column stores the
//! ingredient list as serialized JSON; (de)serialization happens at this
//! boundary. Failures on mutation paths map to 422 per the API contract;
//! read-path failures map to 500.

use crate::errors::ApiError;
use crate::models::{Drink, Ingredient};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

/// Shared SELECT column list for drink queries.
const DRINK_SELECT_QUERY: &str = "SELECT drink_id, title, recipe FROM drinks";

/// Drinks repository for database operations.
pub struct DrinksRepository;

impl DrinksRepository {
    /// List all drinks, oldest first.
    #[instrument(skip_all, name = "drinks.repo.list")]
    pub async fn list(pool: &PgPool) -> Result<Vec<Drink>, ApiError> {
        let query = format!("{DRINK_SELECT_QUERY} ORDER BY drink_id");
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        rows.into_iter().map(map_row_to_drink).collect()
    }

    /// Find a drink by its id.
    #[instrument(skip_all, name = "drinks.repo.find", fields(drink_id = %drink_id))]
    pub async fn find_by_id(pool: &PgPool, drink_id: i64) -> Result<Option<Drink>, ApiError> {
        let query = format!("{DRINK_SELECT_QUERY} WHERE drink_id = $1");
        let row = sqlx::query(&query)
            .bind(drink_id)
            .fetch_optional(pool)
            .await?;

        row.map(map_row_to_drink).transpose()
    }

    /// Check whether a title is already taken, optionally excluding one row
    /// (the row being updated).
    #[instrument(skip_all, name = "drinks.repo.title_exists")]
    pub async fn title_exists(
        pool: &PgPool,
        title: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM drinks
                WHERE title = $1 AND ($2::BIGINT IS NULL OR drink_id <> $2)
            ) AS taken
            "#,
        )
        .bind(title)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(row.get("taken"))
    }

    /// Insert a new drink.
    ///
    /// Any failure maps to 422, a lost race on the title uniqueness
    /// constraint included.
    #[instrument(skip_all, name = "drinks.repo.insert")]
    pub async fn insert(
        pool: &PgPool,
        title: &str,
        recipe: &[Ingredient],
    ) -> Result<Drink, ApiError> {
        let recipe_json = encode_recipe(recipe)?;

        let row = sqlx::query(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING drink_id, title, recipe
            "#,
        )
        .bind(title)
        .bind(recipe_json)
        .fetch_one(pool)
        .await
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

        map_row_to_drink(row)
    }

    /// Apply a partial update; only provided fields change.
    #[instrument(skip_all, name = "drinks.repo.update", fields(drink_id = %drink_id))]
    pub async fn update(
        pool: &PgPool,
        drink_id: i64,
        title: Option<&str>,
        recipe: Option<&[Ingredient]>,
    ) -> Result<Drink, ApiError> {
        let recipe_json = recipe.map(encode_recipe).transpose()?;

        let row = sqlx::query(
            r#"
            UPDATE drinks
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE drink_id = $1
            RETURNING drink_id, title, recipe
            "#,
        )
        .bind(drink_id)
        .bind(title)
        .bind(recipe_json)
        .fetch_optional(pool)
        .await
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("drink {drink_id}")))?;

        map_row_to_drink(row)
    }

    /// Delete a drink. Returns false when no row matched.
    #[instrument(skip_all, name = "drinks.repo.delete", fields(drink_id = %drink_id))]
    pub async fn delete(pool: &PgPool, drink_id: i64) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM drinks WHERE drink_id = $1")
            .bind(drink_id)
            .execute(pool)
            .await
            .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Serialize a recipe for storage.
fn encode_recipe(recipe: &[Ingredient]) -> Result<String, ApiError> {
    serde_json::to_string(recipe)
        .map_err(|e| ApiError::Unprocessable(format!("unencodable recipe: {e}")))
}

/// Map a database row to a Drink.
fn map_row_to_drink(row: PgRow) -> Result<Drink, ApiError> {
    let recipe_json: String = row.get("recipe");
    let recipe: Vec<Ingredient> = serde_json::from_str(&recipe_json).map_err(|e| {
        tracing::error!(target: "drinks.repo", error = %e, "Stored recipe is not valid JSON");
        ApiError::Database(format!("corrupt recipe column: {e}"))
    })?;

    Ok(Drink {
        drink_id: row.get("drink_id"),
        title: row.get("title"),
        recipe,
    })
}
