//! Built-in sample catalog for trying the analyzer without an export

use rusqlite::Connection;

use crate::config::AnalyzerConfig;
use crate::db::{self, ComponentRecord, RecipeRecord, StockRecord, UnitRecord, VendorItemRecord};
use crate::error::CatalogError;
use crate::import::{self, CatalogSnapshot};
use crate::models::{IngredientRef, Location};

pub const SAN_DIEGO: &str = "loc-san-diego";
pub const LOS_ANGELES: &str = "loc-los-angeles";

/// (name, dimension, size in base unit)
const UNIT_TABLE: [(&str, &str, f64); 16] = [
    ("each", "count", 1.0),
    ("dozen", "count", 12.0),
    ("g", "mass", 1.0),
    ("kg", "mass", 1000.0),
    ("oz", "mass", 28.35),
    ("lb", "mass", 453.59),
    ("ml", "volume", 1.0),
    ("L", "volume", 1000.0),
    ("tsp", "volume", 4.93),
    ("tbsp", "volume", 14.79),
    ("cup", "volume", 236.59),
    ("gal", "volume", 3785.41),
    // package sizes vary per vendor item, so they never convert
    ("case", "case", 1.0),
    ("pack", "pack", 1.0),
    ("jar", "jar", 1.0),
    ("container", "container", 1.0),
];

fn ingredient(id: &str, name: &str) -> IngredientRef {
    IngredientRef {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn uses(ingredient_id: &str, quantity: f64, unit_id: &str) -> ComponentRecord {
    ComponentRecord {
        ingredient_id: Some(ingredient_id.to_string()),
        sub_recipe_id: None,
        quantity,
        unit_id: unit_id.to_string(),
    }
}

fn vendor_item(id: &str, name: &str, sku: &str, ingredient_id: &str, location_id: &str) -> VendorItemRecord {
    VendorItemRecord {
        id: id.to_string(),
        name: name.to_string(),
        sku: Some(sku.to_string()),
        ingredient_id: ingredient_id.to_string(),
        location_id: location_id.to_string(),
    }
}

fn stock(vendor_item_id: &str, location_id: &str, quantity: f64, unit_id: &str) -> StockRecord {
    StockRecord {
        vendor_item_id: vendor_item_id.to_string(),
        location_id: location_id.to_string(),
        quantity,
        unit_id: Some(unit_id.to_string()),
    }
}

/// The sample catalog.
///
/// San Diego can make Caesar Salad but not Galley Burger (no vendor item
/// for pickle relish, cheddar out of stock with one item negative).
/// Los Angeles only stocks buns and patties.
pub fn sample_snapshot(config: &AnalyzerConfig) -> CatalogSnapshot {
    let unit = |name: &str| config.resolve_unit(Some(name)).to_string();

    let units = UNIT_TABLE
        .iter()
        .map(|&(name, dimension, to_base)| UnitRecord {
            id: unit(name),
            name: name.to_string(),
            dimension: dimension.to_string(),
            to_base,
        })
        .collect();

    let locations = vec![
        Location {
            id: SAN_DIEGO.to_string(),
            name: "San Diego".to_string(),
            city: Some("San Diego".to_string()),
            state: Some("CA".to_string()),
        },
        Location {
            id: LOS_ANGELES.to_string(),
            name: "Los Angeles".to_string(),
            city: Some("Los Angeles".to_string()),
            state: Some("CA".to_string()),
        },
    ];

    let ingredients = vec![
        ingredient("ing-bun", "Brioche Bun"),
        ingredient("ing-patty", "Beef Patty"),
        ingredient("ing-cheddar", "Cheddar Slice"),
        ingredient("ing-lettuce", "Iceberg Lettuce"),
        ingredient("ing-mayo", "Mayonnaise"),
        ingredient("ing-ketchup", "Ketchup"),
        ingredient("ing-relish", "Pickle Relish"),
        ingredient("ing-romaine", "Romaine"),
        ingredient("ing-parmesan", "Parmesan"),
        ingredient("ing-crouton", "Croutons"),
        ingredient("ing-dressing", "Caesar Dressing"),
    ];

    let recipes = vec![
        RecipeRecord {
            id: "rcp-burger-sauce".to_string(),
            name: "Burger Sauce".to_string(),
            description: Some("House sauce".to_string()),
            yield_unit_id: unit("L"),
            total_yield: 1.0,
            components: vec![
                uses("ing-mayo", 600.0, &unit("ml")),
                uses("ing-ketchup", 300.0, &unit("ml")),
                uses("ing-relish", 100.0, &unit("g")),
            ],
        },
        RecipeRecord {
            id: "rcp-galley-burger".to_string(),
            name: "Galley Burger".to_string(),
            description: Some("Cheeseburger with house sauce".to_string()),
            yield_unit_id: unit("each"),
            total_yield: 1.0,
            components: vec![
                uses("ing-bun", 1.0, &unit("each")),
                uses("ing-patty", 1.0, &unit("each")),
                uses("ing-cheddar", 1.0, &unit("each")),
                uses("ing-lettuce", 20.0, &unit("g")),
                ComponentRecord {
                    ingredient_id: None,
                    sub_recipe_id: Some("rcp-burger-sauce".to_string()),
                    quantity: 30.0,
                    unit_id: unit("ml"),
                },
            ],
        },
        RecipeRecord {
            id: "rcp-galley-burger-double".to_string(),
            name: "Galley Burger Double".to_string(),
            description: None,
            yield_unit_id: unit("each"),
            total_yield: 1.0,
            components: vec![
                uses("ing-bun", 1.0, &unit("each")),
                uses("ing-patty", 2.0, &unit("each")),
            ],
        },
        RecipeRecord {
            id: "rcp-caesar-salad".to_string(),
            name: "Caesar Salad".to_string(),
            description: Some("Romaine, parmesan, croutons".to_string()),
            yield_unit_id: unit("each"),
            total_yield: 1.0,
            components: vec![
                uses("ing-romaine", 150.0, &unit("g")),
                uses("ing-parmesan", 20.0, &unit("g")),
                uses("ing-crouton", 30.0, &unit("g")),
                uses("ing-dressing", 45.0, &unit("ml")),
            ],
        },
    ];

    let vendor_items = vec![
        vendor_item("vi-sd-bun", "Brioche Bun 48ct", "BUN-48", "ing-bun", SAN_DIEGO),
        vendor_item("vi-sd-patty", "Beef Patty 4oz", "BEEF-4", "ing-patty", SAN_DIEGO),
        vendor_item("vi-sd-cheddar", "Cheddar Sliced", "CHD-SL", "ing-cheddar", SAN_DIEGO),
        vendor_item("vi-sd-cheddar-alt", "Cheddar Sliced (alt)", "CHD-SL-2", "ing-cheddar", SAN_DIEGO),
        vendor_item("vi-sd-lettuce", "Iceberg Head", "LET-ICE", "ing-lettuce", SAN_DIEGO),
        vendor_item("vi-sd-mayo", "Mayonnaise 1gal", "MAY-1G", "ing-mayo", SAN_DIEGO),
        vendor_item("vi-sd-ketchup", "Ketchup 1gal", "KET-1G", "ing-ketchup", SAN_DIEGO),
        vendor_item("vi-sd-romaine", "Romaine Hearts", "ROM-H", "ing-romaine", SAN_DIEGO),
        vendor_item("vi-sd-parmesan", "Parmesan Grated", "PAR-G", "ing-parmesan", SAN_DIEGO),
        vendor_item("vi-sd-crouton", "Garlic Croutons", "CRT-G", "ing-crouton", SAN_DIEGO),
        vendor_item("vi-sd-dressing", "Caesar Dressing", "DRS-C", "ing-dressing", SAN_DIEGO),
        vendor_item("vi-la-bun", "Brioche Bun 48ct", "BUN-48", "ing-bun", LOS_ANGELES),
        vendor_item("vi-la-patty", "Beef Patty 4oz", "BEEF-4", "ing-patty", LOS_ANGELES),
    ];

    let inventory = vec![
        stock("vi-sd-bun", SAN_DIEGO, 96.0, &unit("each")),
        stock("vi-sd-patty", SAN_DIEGO, 120.0, &unit("each")),
        stock("vi-sd-cheddar", SAN_DIEGO, 0.0, &unit("each")),
        stock("vi-sd-cheddar-alt", SAN_DIEGO, -4.0, &unit("each")),
        stock("vi-sd-lettuce", SAN_DIEGO, 5.0, &unit("kg")),
        stock("vi-sd-mayo", SAN_DIEGO, 2.0, &unit("gal")),
        stock("vi-sd-ketchup", SAN_DIEGO, 3.0, &unit("gal")),
        stock("vi-sd-romaine", SAN_DIEGO, 8.0, &unit("kg")),
        stock("vi-sd-parmesan", SAN_DIEGO, 2.0, &unit("kg")),
        stock("vi-sd-crouton", SAN_DIEGO, 1.5, &unit("kg")),
        stock("vi-sd-dressing", SAN_DIEGO, 4.0, &unit("L")),
        stock("vi-la-bun", LOS_ANGELES, 48.0, &unit("each")),
        stock("vi-la-patty", LOS_ANGELES, 60.0, &unit("each")),
    ];

    CatalogSnapshot {
        units,
        locations,
        ingredients,
        recipes,
        vendor_items,
        inventory,
    }
}

/// Replace the store's contents with the sample catalog
pub fn load_sample_data(conn: &Connection, config: &AnalyzerConfig) -> Result<(), CatalogError> {
    db::clear_catalog(conn)?;
    import::load_snapshot(conn, &sample_snapshot(config))
}
