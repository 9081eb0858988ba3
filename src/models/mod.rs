//! Drinks service models.
//!
//! Data types for the drinks menu plus the request/response types of the
//! HTTP surface. Request bodies are strongly typed at the boundary; the
//! `recipe` field accepts either a single ingredient object or a list and
//! is normalized to a list.

use serde::{Deserialize, Serialize};

/// A single recipe ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    /// Ingredient name (detail form only).
    pub name: String,

    /// Display color for the menu rendering.
    pub color: String,

    /// Proportion of this ingredient in parts.
    pub parts: i64,
}

/// Summary form of an ingredient: color and proportions, name withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: i64,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            color: ingredient.color.clone(),
            parts: ingredient.parts,
        }
    }
}

/// Recipe as accepted on the wire: a list of ingredients or a single
/// ingredient object. Stored and served as a list in both cases.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipePayload {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipePayload {
    /// Normalize to a sequence of ingredients.
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipePayload::Many(ingredients) => ingredients,
            RecipePayload::One(ingredient) => vec![ingredient],
        }
    }
}

/// A drink as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    /// Unique drink identifier.
    pub drink_id: i64,

    /// Drink title, unique across the menu.
    pub title: String,

    /// Ordered ingredient list.
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// Public list serialization: ingredient names withheld.
    pub fn summary(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.drink_id,
            title: self.title.clone(),
            recipe: self.recipe.iter().map(IngredientSummary::from).collect(),
        }
    }

    /// Full serialization for permission-gated reads.
    pub fn detail(&self) -> DrinkDetail {
        DrinkDetail {
            id: self.drink_id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Summary ("short") form of a drink.
#[derive(Debug, Clone, Serialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

/// Detail ("long") form of a drink.
#[derive(Debug, Clone, Serialize)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Request body for creating a drink.
///
/// Both fields are required; they are `Option` here so a missing field
/// surfaces as a 400 with the fixed envelope rather than a framework
/// deserialization response.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipePayload>,
}

impl CreateDrinkRequest {
    /// Validate field presence and normalize the recipe.
    ///
    /// # Errors
    ///
    /// Returns an error message if a required field is missing.
    pub fn validate(self) -> Result<(String, Vec<Ingredient>), &'static str> {
        let title = self.title.ok_or("title is required")?;
        let recipe = self.recipe.ok_or("recipe is required")?;
        Ok((title, recipe.into_ingredients()))
    }
}

/// Request body for updating a drink. Only provided fields are applied.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipePayload>,
}

impl UpdateDrinkRequest {
    /// Check if the request has any changes.
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.recipe.is_some()
    }
}

/// Success envelope for list/create/update responses.
#[derive(Debug, Clone, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// Success envelope for delete responses: echoes the deleted id.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    pub delete: i64,
}

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy" or "unhealthy").
    pub status: String,

    /// Database connectivity status.
    pub database: String,
}
