//! Data models for recipes, locations and on-hand inventory

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub yield_unit: Option<Unit>,
    pub total_yield: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRef {
    pub id: String,
    pub name: String,
}

/// One row of a scaled recipe tree as returned by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct TreeComponent {
    pub component_id: String,
    pub ingredient: IngredientRef,
    pub quantity: f64,
    pub unit: Unit,
}

/// An ingredient requirement already scaled to the target yield
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaledIngredientRequirement {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub required_quantity: f64,
    pub required_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorItemSummary {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
}

/// Ingredient with the vendor items stocking it at one location
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientVendorItems {
    pub ingredient: IngredientRef,
    pub vendor_items: Vec<VendorItemSummary>,
}

/// Vendor item joined with the ingredient it stocks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorItem {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub ingredient_id: String,
    pub ingredient_name: String,
}

/// On-hand quantity as reported for a vendor item at a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnHand {
    pub quantity: f64,
    pub unit: Option<Unit>,
}

/// Vendor item with its on-hand records for the queried location
#[derive(Debug, Clone, PartialEq)]
pub struct VendorItemStock {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub on_hand: Vec<OnHand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub vendor_item_id: String,
    pub on_hand_quantity: f64,
    pub on_hand_unit: Option<Unit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Positive,
    Zero,
    Negative, // tracking drift
}

impl StockLevel {
    pub fn of(quantity: f64) -> Self {
        if quantity > 0.0 {
            StockLevel::Positive
        } else if quantity < 0.0 {
            StockLevel::Negative
        } else {
            StockLevel::Zero
        }
    }
}

/// Vendor item, its owning ingredient and its on-hand inventory merged together
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub vendor_item: VendorItem,
    pub inventory: InventoryRecord,
    pub stock_level: StockLevel,
}

impl InventoryEntry {
    pub fn new(vendor_item: VendorItem, on_hand: Option<OnHand>) -> Self {
        let (quantity, unit) = match on_hand {
            Some(record) => (record.quantity, record.unit),
            None => (0.0, None),
        };
        let inventory = InventoryRecord {
            vendor_item_id: vendor_item.id.clone(),
            on_hand_quantity: quantity,
            on_hand_unit: unit,
        };
        Self {
            vendor_item,
            inventory,
            stock_level: StockLevel::of(quantity),
        }
    }

    pub fn ingredient_id(&self) -> &str {
        &self.vendor_item.ingredient_id
    }

    pub fn on_hand_quantity(&self) -> f64 {
        self.inventory.on_hand_quantity
    }
}
