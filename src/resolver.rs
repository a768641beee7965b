//! Resolve free-text recipe and location names to catalog entities

use tracing::debug;

use crate::catalog::RecipeCatalog;
use crate::error::{AnalysisError, EntityKind, Result};
use crate::models::{Location, Recipe};

/// First location the catalog returns for the name
pub async fn resolve_location(
    catalog: &dyn RecipeCatalog,
    name: &str,
    limit: usize,
) -> Result<Location> {
    let location = catalog
        .find_locations(name, limit)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::NotFound {
            kind: EntityKind::Location,
            name: name.to_string(),
        })?;

    debug!(location_id = %location.id, name = %location.name, "Resolved location");
    Ok(location)
}

/// Exact (case-insensitive) name match if there is one, otherwise the first result
pub async fn resolve_recipe(
    catalog: &dyn RecipeCatalog,
    name: &str,
    limit: usize,
) -> Result<Recipe> {
    let recipes = catalog.find_recipes(name, limit).await?;
    let recipe = pick_recipe(recipes, name).ok_or_else(|| AnalysisError::NotFound {
        kind: EntityKind::Recipe,
        name: name.to_string(),
    })?;

    debug!(recipe_id = %recipe.id, name = %recipe.name, "Resolved recipe");
    Ok(recipe)
}

fn pick_recipe(recipes: Vec<Recipe>, name: &str) -> Option<Recipe> {
    let wanted = name.to_lowercase();
    let exact = recipes
        .iter()
        .position(|recipe| recipe.name.to_lowercase() == wanted)
        .unwrap_or(0);
    recipes.into_iter().nth(exact)
}
