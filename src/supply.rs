//! Supply-chain mapping: ingredient -> vendor item -> on-hand inventory
//!
//! Stock is tracked per purchasable vendor item rather than per ingredient,
//! and one ingredient may be stocked through several interchangeable items.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::RecipeCatalog;
use crate::error::{CatalogError, Result};
use crate::models::{InventoryEntry, ScaledIngredientRequirement, VendorItem};

/// Vendor items keyed by id in catalog order, each carrying its owning ingredient
pub type VendorItemMap = IndexMap<String, VendorItem>;

/// Inventory entries keyed by vendor item id in catalog order
pub type InventoryMap = IndexMap<String, InventoryEntry>;

/// Distinct ingredient ids in first-seen order
pub fn unique_ingredient_ids(requirements: &[ScaledIngredientRequirement]) -> Vec<String> {
    let mut seen = HashSet::new();
    requirements
        .iter()
        .filter(|req| seen.insert(req.ingredient_id.as_str()))
        .map(|req| req.ingredient_id.clone())
        .collect()
}

pub async fn vendor_items_for(
    catalog: &dyn RecipeCatalog,
    requirements: &[ScaledIngredientRequirement],
    location_id: &str,
    limit: usize,
) -> Result<VendorItemMap> {
    let ingredient_ids = unique_ingredient_ids(requirements);
    let ingredients = catalog
        .ingredient_vendor_items(&ingredient_ids, location_id, limit)
        .await?;

    let mut vendor_items = VendorItemMap::new();
    for ingredient in ingredients {
        for item in ingredient.vendor_items {
            vendor_items.insert(
                item.id.clone(),
                VendorItem {
                    id: item.id,
                    name: item.name,
                    sku: item.sku,
                    ingredient_id: ingredient.ingredient.id.clone(),
                    ingredient_name: ingredient.ingredient.name.clone(),
                },
            );
        }
    }

    debug!(
        ingredients = ingredient_ids.len(),
        vendor_items = vendor_items.len(),
        "Mapped ingredients to vendor items"
    );
    Ok(vendor_items)
}

pub async fn inventory_for(
    catalog: &dyn RecipeCatalog,
    vendor_items: &VendorItemMap,
    location_id: &str,
    limit: usize,
) -> Result<InventoryMap> {
    if vendor_items.is_empty() {
        return Ok(InventoryMap::new());
    }

    let vendor_item_ids: Vec<String> = vendor_items.keys().cloned().collect();
    let stocks = catalog
        .vendor_item_inventory(&vendor_item_ids, location_id, limit)
        .await?;

    let mut inventory = InventoryMap::new();
    for stock in stocks {
        let known = vendor_items.get(&stock.id).ok_or_else(|| {
            CatalogError::Malformed(format!(
                "inventory returned unrequested vendor item {}",
                stock.id
            ))
        })?;
        let vendor_item = VendorItem {
            id: stock.id.clone(),
            name: stock.name,
            sku: stock.sku,
            ingredient_id: known.ingredient_id.clone(),
            ingredient_name: known.ingredient_name.clone(),
        };
        let on_hand = stock.on_hand.into_iter().next();
        inventory.insert(stock.id, InventoryEntry::new(vendor_item, on_hand));
    }

    debug!(entries = inventory.len(), "Resolved on-hand inventory");
    Ok(inventory)
}
