//! Query capability the analyzer runs against
//!
//! One method per logical read query. The analyzer never assumes anything
//! about how the queries are answered, so a remote service client, the
//! local SQLite store and test fixtures are interchangeable.

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::models::{
    IngredientVendorItems, Location, Recipe, TreeComponent, VendorItemStock,
};

/// Parameters for a scaled recipe tree request
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTreeRequest<'a> {
    pub recipe_id: &'a str,
    pub location_id: &'a str,
    pub scaled_yield: f64,
    pub scaled_unit_id: &'a str,
    /// `[-1]` leaves only, `[0]` top level only, `[]` every level
    pub levels: &'a [i32],
}

#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Locations whose name matches, in catalog order
    async fn find_locations(&self, name: &str, limit: usize)
    -> Result<Vec<Location>, CatalogError>;

    /// Recipes whose name matches, in catalog order
    async fn find_recipes(&self, name: &str, limit: usize) -> Result<Vec<Recipe>, CatalogError>;

    /// Recipe tree components pre-scaled to the requested yield
    async fn scaled_recipe_tree(
        &self,
        request: ScaledTreeRequest<'_>,
    ) -> Result<Vec<TreeComponent>, CatalogError>;

    /// Ingredients with the vendor items registered for them at a location
    async fn ingredient_vendor_items(
        &self,
        ingredient_ids: &[String],
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<IngredientVendorItems>, CatalogError>;

    /// Vendor items with their on-hand inventory at a location
    async fn vendor_item_inventory(
        &self,
        vendor_item_ids: &[String],
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<VendorItemStock>, CatalogError>;
}
