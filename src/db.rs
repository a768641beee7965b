//! SQLite catalog store
//!
//! Holds a snapshot of units, locations, recipes, vendor items and on-hand
//! inventory, and answers the catalog queries locally, including scaling a
//! recipe tree to a target yield.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;

use crate::catalog::{RecipeCatalog, ScaledTreeRequest};
use crate::error::CatalogError;
use crate::models::{
    IngredientRef, IngredientVendorItems, Location, OnHand, Recipe, TreeComponent, Unit,
    VendorItemStock, VendorItemSummary,
};

type Result<T> = std::result::Result<T, CatalogError>;

/// Nesting limit when expanding sub-recipes
const MAX_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub id: String,
    pub name: String,
    /// Units convert only within a dimension (count, mass, volume, ...)
    pub dimension: String,
    /// Size of one unit in the dimension's base unit
    #[serde(default = "default_to_base")]
    pub to_base: f64,
}

fn default_to_base() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub yield_unit_id: String,
    pub total_yield: f64,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

/// Either an ingredient or a sub-recipe, in `unit_id` per recipe yield
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub ingredient_id: Option<String>,
    pub sub_recipe_id: Option<String>,
    pub quantity: f64,
    pub unit_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorItemRecord {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub ingredient_id: String,
    pub location_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub vendor_item_id: String,
    pub location_id: String,
    pub quantity: f64,
    pub unit_id: Option<String>,
}

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS units (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            dimension TEXT NOT NULL,
            to_base REAL NOT NULL DEFAULT 1.0
        );

        CREATE TABLE IF NOT EXISTS locations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            city TEXT,
            state TEXT
        );

        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            yield_unit_id TEXT NOT NULL,
            total_yield REAL NOT NULL
        );

        -- Exactly one of ingredient_id / sub_recipe_id is set
        CREATE TABLE IF NOT EXISTS recipe_components (
            recipe_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            ingredient_id TEXT,
            sub_recipe_id TEXT,
            quantity REAL NOT NULL,
            unit_id TEXT NOT NULL,
            PRIMARY KEY (recipe_id, position),
            CHECK ((ingredient_id IS NULL) != (sub_recipe_id IS NULL))
        );

        CREATE TABLE IF NOT EXISTS vendor_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sku TEXT,
            ingredient_id TEXT NOT NULL,
            location_id TEXT NOT NULL
        );

        -- On-hand may go negative when tracking drifts
        CREATE TABLE IF NOT EXISTS inventory_items (
            vendor_item_id TEXT NOT NULL,
            location_id TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_id TEXT,
            PRIMARY KEY (vendor_item_id, location_id)
        );

        CREATE INDEX IF NOT EXISTS idx_vendor_items_ingredient ON vendor_items(ingredient_id, location_id);
        "#,
    )?;
    Ok(())
}

/// Clear all catalog data (for re-import)
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM inventory_items;
        DELETE FROM vendor_items;
        DELETE FROM recipe_components;
        DELETE FROM recipes;
        DELETE FROM ingredients;
        DELETE FROM locations;
        DELETE FROM units;
        "#,
    )?;
    Ok(())
}

pub fn upsert_unit(conn: &Connection, unit: &UnitRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO units (id, name, dimension, to_base) VALUES (?1, ?2, ?3, ?4)",
        (&unit.id, &unit.name, &unit.dimension, unit.to_base),
    )?;
    Ok(())
}

pub fn upsert_location(conn: &Connection, location: &Location) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO locations (id, name, city, state) VALUES (?1, ?2, ?3, ?4)",
        (&location.id, &location.name, &location.city, &location.state),
    )?;
    Ok(())
}

pub fn upsert_ingredient(conn: &Connection, ingredient: &IngredientRef) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO ingredients (id, name) VALUES (?1, ?2)",
        (&ingredient.id, &ingredient.name),
    )?;
    Ok(())
}

/// Insert or replace a recipe together with its components
pub fn upsert_recipe(conn: &Connection, recipe: &RecipeRecord) -> Result<()> {
    for component in &recipe.components {
        if component.ingredient_id.is_some() == component.sub_recipe_id.is_some() {
            return Err(CatalogError::Malformed(format!(
                "component of recipe {} must name exactly one ingredient or sub-recipe",
                recipe.id
            )));
        }
    }

    conn.execute(
        "INSERT OR REPLACE INTO recipes (id, name, description, yield_unit_id, total_yield)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &recipe.id,
            &recipe.name,
            &recipe.description,
            &recipe.yield_unit_id,
            recipe.total_yield,
        ),
    )?;
    conn.execute(
        "DELETE FROM recipe_components WHERE recipe_id = ?1",
        [&recipe.id],
    )?;
    for (position, component) in recipe.components.iter().enumerate() {
        conn.execute(
            "INSERT INTO recipe_components (recipe_id, position, ingredient_id, sub_recipe_id, quantity, unit_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &recipe.id,
                position as i64,
                &component.ingredient_id,
                &component.sub_recipe_id,
                component.quantity,
                &component.unit_id,
            ),
        )?;
    }
    Ok(())
}

pub fn upsert_vendor_item(conn: &Connection, item: &VendorItemRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO vendor_items (id, name, sku, ingredient_id, location_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &item.id,
            &item.name,
            &item.sku,
            &item.ingredient_id,
            &item.location_id,
        ),
    )?;
    Ok(())
}

pub fn upsert_stock(conn: &Connection, stock: &StockRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO inventory_items (vendor_item_id, location_id, quantity, unit_id)
         VALUES (?1, ?2, ?3, ?4)",
        (
            &stock.vendor_item_id,
            &stock.location_id,
            stock.quantity,
            &stock.unit_id,
        ),
    )?;
    Ok(())
}

/// Locations whose name contains `name` (case-insensitive), in insertion order
pub fn find_locations(conn: &Connection, name: &str, limit: usize) -> Result<Vec<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, city, state FROM locations
         WHERE instr(lower(name), lower(?1)) > 0
         ORDER BY rowid LIMIT ?2",
    )?;

    let rows = stmt.query_map((name, limit as i64), |row| {
        Ok(Location {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Recipes whose name contains `name` (case-insensitive), in insertion order
pub fn find_recipes(conn: &Connection, name: &str, limit: usize) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name, r.description, u.id, u.name, r.total_yield
         FROM recipes r
         LEFT JOIN units u ON u.id = r.yield_unit_id
         WHERE instr(lower(r.name), lower(?1)) > 0
         ORDER BY r.rowid LIMIT ?2",
    )?;

    let rows = stmt.query_map((name, limit as i64), recipe_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn recipe_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let unit_id: Option<String> = row.get(3)?;
    let unit_name: Option<String> = row.get(4)?;
    Ok(Recipe {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        yield_unit: unit_id.zip(unit_name).map(|(id, name)| Unit { id, name }),
        total_yield: row.get(5)?,
    })
}

pub fn list_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.name, r.description, u.id, u.name, r.total_yield
         FROM recipes r
         LEFT JOIN units u ON u.id = r.yield_unit_id
         ORDER BY r.name",
    )?;
    let rows = stmt.query_map([], recipe_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

pub fn list_locations(conn: &Connection) -> Result<Vec<Location>> {
    let mut stmt = conn.prepare("SELECT id, name, city, state FROM locations ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Location {
            id: row.get(0)?,
            name: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

#[derive(Debug, Clone)]
struct UnitRow {
    id: String,
    name: String,
    dimension: String,
    to_base: f64,
}

fn get_unit(conn: &Connection, unit_id: &str) -> Result<UnitRow> {
    conn.query_row(
        "SELECT id, name, dimension, to_base FROM units WHERE id = ?1",
        [unit_id],
        |row| {
            Ok(UnitRow {
                id: row.get(0)?,
                name: row.get(1)?,
                dimension: row.get(2)?,
                to_base: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| CatalogError::UnknownUnit(unit_id.to_string()))
}

/// How many recipe yields `quantity` of `unit_id` amounts to
fn yields_in(conn: &Connection, quantity: f64, unit_id: &str, recipe_id: &str) -> Result<f64> {
    let (yield_unit_id, total_yield): (String, f64) = conn
        .query_row(
            "SELECT yield_unit_id, total_yield FROM recipes WHERE id = ?1",
            [recipe_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| CatalogError::NotFound(format!("recipe {}", recipe_id)))?;

    if total_yield <= 0.0 {
        return Err(CatalogError::Malformed(format!(
            "recipe {} has non-positive total yield",
            recipe_id
        )));
    }

    let from = get_unit(conn, unit_id)?;
    let to = get_unit(conn, &yield_unit_id)?;
    if from.dimension != to.dimension {
        return Err(CatalogError::IncompatibleUnits {
            from: from.name,
            to: to.name,
        });
    }

    Ok(quantity * from.to_base / (total_yield * to.to_base))
}

struct ComponentRow {
    position: i64,
    ingredient: Option<IngredientRef>,
    sub_recipe_id: Option<String>,
    quantity: f64,
    unit_id: String,
}

fn get_components(conn: &Connection, recipe_id: &str) -> Result<Vec<ComponentRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.position, c.ingredient_id, i.name, c.sub_recipe_id, c.quantity, c.unit_id
         FROM recipe_components c
         LEFT JOIN ingredients i ON i.id = c.ingredient_id
         WHERE c.recipe_id = ?1
         ORDER BY c.position",
    )?;

    let rows = stmt.query_map([recipe_id], |row| {
        let ingredient_id: Option<String> = row.get(1)?;
        let ingredient_name: Option<String> = row.get(2)?;
        Ok(ComponentRow {
            position: row.get(0)?,
            ingredient: ingredient_id.map(|id| IngredientRef {
                name: ingredient_name.unwrap_or_else(|| id.clone()),
                id,
            }),
            sub_recipe_id: row.get(3)?,
            quantity: row.get(4)?,
            unit_id: row.get(5)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Ingredient components of a recipe scaled to the requested yield.
///
/// Sub-recipes are expanded in place and never returned themselves.
/// `levels`: empty selects every depth, `-1` selects leaf ingredients,
/// any other value selects ingredients at that depth (0 = top level).
pub fn scaled_recipe_tree(
    conn: &Connection,
    request: &ScaledTreeRequest<'_>,
) -> Result<Vec<TreeComponent>> {
    let factor = yields_in(
        conn,
        request.scaled_yield,
        request.scaled_unit_id,
        request.recipe_id,
    )?;

    let mut components = Vec::new();
    expand_tree(
        conn,
        request.recipe_id,
        factor,
        request.levels,
        0,
        request.recipe_id,
        &mut components,
    )?;
    Ok(components)
}

fn expand_tree(
    conn: &Connection,
    recipe_id: &str,
    factor: f64,
    levels: &[i32],
    depth: usize,
    path: &str,
    out: &mut Vec<TreeComponent>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(CatalogError::RecipeCycle(recipe_id.to_string()));
    }

    for component in get_components(conn, recipe_id)? {
        let quantity = component.quantity * factor;
        let component_id = format!("{}/{}", path, component.position);

        if let Some(sub_recipe_id) = &component.sub_recipe_id {
            let sub_factor = yields_in(conn, quantity, &component.unit_id, sub_recipe_id)?;
            expand_tree(
                conn,
                sub_recipe_id,
                sub_factor,
                levels,
                depth + 1,
                &component_id,
                out,
            )?;
            continue;
        }

        let Some(ingredient) = component.ingredient else {
            continue;
        };
        if !level_selected(levels, depth) {
            continue;
        }

        let unit = get_unit(conn, &component.unit_id)?;
        out.push(TreeComponent {
            component_id,
            ingredient,
            quantity,
            unit: Unit {
                id: unit.id,
                name: unit.name,
            },
        });
    }

    Ok(())
}

fn level_selected(levels: &[i32], depth: usize) -> bool {
    levels.is_empty()
        || levels
            .iter()
            .any(|&level| level == -1 || usize::try_from(level).is_ok_and(|l| l == depth))
}

pub fn ingredient_vendor_items(
    conn: &Connection,
    ingredient_ids: &[String],
    location_id: &str,
    limit: usize,
) -> Result<Vec<IngredientVendorItems>> {
    let mut ingredient_stmt = conn.prepare("SELECT id, name FROM ingredients WHERE id = ?1")?;
    let mut item_stmt = conn.prepare(
        "SELECT id, name, sku FROM vendor_items
         WHERE ingredient_id = ?1 AND location_id = ?2
         ORDER BY rowid",
    )?;

    let mut results = Vec::new();
    for ingredient_id in ingredient_ids.iter().take(limit) {
        let ingredient = ingredient_stmt
            .query_row([ingredient_id], |row| {
                Ok(IngredientRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        let Some(ingredient) = ingredient else {
            continue;
        };

        let rows = item_stmt.query_map((ingredient_id, location_id), |row| {
            Ok(VendorItemSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                sku: row.get(2)?,
            })
        })?;
        let mut vendor_items = Vec::new();
        for row in rows {
            vendor_items.push(row?);
        }

        results.push(IngredientVendorItems {
            ingredient,
            vendor_items,
        });
    }
    Ok(results)
}

pub fn vendor_item_inventory(
    conn: &Connection,
    vendor_item_ids: &[String],
    location_id: &str,
    limit: usize,
) -> Result<Vec<VendorItemStock>> {
    let mut item_stmt = conn.prepare("SELECT id, name, sku FROM vendor_items WHERE id = ?1")?;
    let mut stock_stmt = conn.prepare(
        "SELECT s.quantity, u.id, u.name
         FROM inventory_items s
         LEFT JOIN units u ON u.id = s.unit_id
         WHERE s.vendor_item_id = ?1 AND s.location_id = ?2",
    )?;

    let mut results = Vec::new();
    for vendor_item_id in vendor_item_ids.iter().take(limit) {
        let item = item_stmt
            .query_row([vendor_item_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .optional()?;
        let Some((id, name, sku)) = item else {
            continue;
        };

        let rows = stock_stmt.query_map((vendor_item_id, location_id), |row| {
            let unit_id: Option<String> = row.get(1)?;
            let unit_name: Option<String> = row.get(2)?;
            Ok(OnHand {
                quantity: row.get(0)?,
                unit: unit_id.zip(unit_name).map(|(id, name)| Unit { id, name }),
            })
        })?;
        let mut on_hand = Vec::new();
        for row in rows {
            on_hand.push(row?);
        }

        results.push(VendorItemStock {
            id,
            name,
            sku,
            on_hand,
        });
    }
    Ok(results)
}

/// [`RecipeCatalog`] backed by a SQLite database
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open (or create) a catalog database and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Direct access to the connection for loading and listing
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecipeCatalog for SqliteCatalog {
    async fn find_locations(&self, name: &str, limit: usize) -> Result<Vec<Location>> {
        find_locations(&self.connection(), name, limit)
    }

    async fn find_recipes(&self, name: &str, limit: usize) -> Result<Vec<Recipe>> {
        find_recipes(&self.connection(), name, limit)
    }

    async fn scaled_recipe_tree(
        &self,
        request: ScaledTreeRequest<'_>,
    ) -> Result<Vec<TreeComponent>> {
        scaled_recipe_tree(&self.connection(), &request)
    }

    async fn ingredient_vendor_items(
        &self,
        ingredient_ids: &[String],
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<IngredientVendorItems>> {
        ingredient_vendor_items(&self.connection(), ingredient_ids, location_id, limit)
    }

    async fn vendor_item_inventory(
        &self,
        vendor_item_ids: &[String],
        location_id: &str,
        limit: usize,
    ) -> Result<Vec<VendorItemStock>> {
        vendor_item_inventory(&self.connection(), vendor_item_ids, location_id, limit)
    }
}
