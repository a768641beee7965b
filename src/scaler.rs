//! Scaled ingredient requirements for a target yield
//!
//! The catalog does the scaling arithmetic; this only shapes the request and
//! flattens the returned components into requirements.

use tracing::{debug, warn};

use crate::catalog::{RecipeCatalog, ScaledTreeRequest};
use crate::error::Result;
use crate::models::{ScaledIngredientRequirement, TreeComponent};

pub async fn scaled_requirements(
    catalog: &dyn RecipeCatalog,
    request: ScaledTreeRequest<'_>,
) -> Result<Vec<ScaledIngredientRequirement>> {
    let recipe_id = request.recipe_id;
    let components = catalog.scaled_recipe_tree(request).await?;

    if components.is_empty() {
        warn!(recipe_id = %recipe_id, "Recipe has no ingredient components");
    }

    let requirements: Vec<_> = components.into_iter().map(to_requirement).collect();
    debug!(count = requirements.len(), "Scaled ingredient requirements");
    Ok(requirements)
}

fn to_requirement(component: TreeComponent) -> ScaledIngredientRequirement {
    ScaledIngredientRequirement {
        ingredient_id: component.ingredient.id,
        ingredient_name: component.ingredient.name,
        required_quantity: component.quantity,
        required_unit: component.unit.name,
    }
}
