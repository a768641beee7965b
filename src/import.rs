//! Catalog snapshot import
//!
//! Reads JSON catalog exports (units, locations, ingredients, recipes,
//! vendor items and on-hand inventory) from a directory tree and loads
//! them into the SQLite store.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::db::{self, RecipeRecord, StockRecord, UnitRecord, VendorItemRecord};
use crate::error::CatalogError;
use crate::models::{IngredientRef, Location};

/// One exported catalog file; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub units: Vec<UnitRecord>,
    pub locations: Vec<Location>,
    pub ingredients: Vec<IngredientRef>,
    pub recipes: Vec<RecipeRecord>,
    pub vendor_items: Vec<VendorItemRecord>,
    pub inventory: Vec<StockRecord>,
}

impl CatalogSnapshot {
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Find all snapshot files (`*.json`) under a directory, sorted by path
pub fn find_snapshot_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Write one snapshot into the store, inside a single transaction
pub fn load_snapshot(conn: &Connection, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
    let tx = conn.unchecked_transaction()?;

    for unit in &snapshot.units {
        db::upsert_unit(&tx, unit)?;
    }
    for location in &snapshot.locations {
        db::upsert_location(&tx, location)?;
    }
    for ingredient in &snapshot.ingredients {
        db::upsert_ingredient(&tx, ingredient)?;
    }
    for recipe in &snapshot.recipes {
        db::upsert_recipe(&tx, recipe)?;
    }
    for item in &snapshot.vendor_items {
        db::upsert_vendor_item(&tx, item)?;
    }
    for stock in &snapshot.inventory {
        db::upsert_stock(&tx, stock)?;
    }

    tx.commit()?;
    Ok(())
}

fn import_file(conn: &Connection, path: &Path) -> Result<CatalogSnapshot, CatalogError> {
    let content = fs::read_to_string(path)?;
    let snapshot = CatalogSnapshot::from_json(&content)?;
    load_snapshot(conn, &snapshot)?;
    Ok(snapshot)
}

/// Import every snapshot file under `dir`; bad files are counted and skipped
pub fn import_directory(conn: &Connection, dir: &Path) -> Result<ImportStats, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::NotFound(format!(
            "snapshot directory {}",
            dir.display()
        )));
    }

    let files = find_snapshot_files(dir);
    debug!(count = files.len(), dir = %dir.display(), "Found snapshot files");

    let mut stats = ImportStats::default();
    for path in &files {
        match import_file(conn, path) {
            Ok(snapshot) => {
                stats.files += 1;
                stats.units += snapshot.units.len();
                stats.locations += snapshot.locations.len();
                stats.ingredients += snapshot.ingredients.len();
                stats.recipes += snapshot.recipes.len();
                stats.vendor_items += snapshot.vendor_items.len();
                stats.inventory += snapshot.inventory.len();
                debug!(file = %path.display(), "Imported snapshot");
            }
            Err(e) => {
                warn!("Error importing {}: {}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    pub files: usize,
    pub units: usize,
    pub locations: usize,
    pub ingredients: usize,
    pub recipes: usize,
    pub vendor_items: usize,
    pub inventory: usize,
    pub errors: usize,
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} files: {} units, {} locations, {} ingredients, {} recipes, {} vendor items, {} inventory records. Errors: {}",
            self.files,
            self.units,
            self.locations,
            self.ingredients,
            self.recipes,
            self.vendor_items,
            self.inventory,
            self.errors
        )
    }
}
