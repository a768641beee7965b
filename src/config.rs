//! Analyzer configuration
//!
//! Unit ids, query page sizes, validation limits and report messages live in
//! one immutable structure handed to the analyzer. Values can be overridden
//! from a TOML file; anything left out keeps its default.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unit id of "each", used when no target unit is given
pub const EACH_UNIT_ID: &str = "dW5pdDoxNA==";

/// Level selector for leaf components only
pub const LEAF_LEVELS: [i32; 1] = [-1];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub default_unit_id: String,
    /// Short unit names (as typed on the command line) to unit ids
    pub units: BTreeMap<String, String>,
    pub leaf_levels: Vec<i32>,
    pub page_size: PageSize,
    pub validation: Validation,
    pub messages: Messages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub locations: usize,
    pub recipes: usize,
    pub ingredients: usize,
    pub vendor_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    pub min_quantity: f64,
    pub max_quantity: f64,
    pub max_name_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub cannot_produce: String,
    pub setup_vendor_items: String,
    pub restock: String,
    pub negative_inventory: String,
    pub production_possible: String,
    pub monitor_stock: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let units = [
            ("each", EACH_UNIT_ID),
            ("dozen", "dW5pdDo0NjgzNzA="),
            ("g", "dW5pdDox"),
            ("kg", "dW5pdDoy"),
            ("oz", "dW5pdDoz"),
            ("lb", "dW5pdDo0"),
            ("ml", "dW5pdDo2"),
            ("L", "dW5pdDo1"),
            ("tsp", "dW5pdDo3"),
            ("tbsp", "dW5pdDo4"),
            ("cup", "dW5pdDoxMw=="),
            ("gal", "dW5pdDoxMQ=="),
            ("case", "dW5pdDoxMDcxNjQ="),
            ("pack", "dW5pdDo5MzEwMTA="),
            ("jar", "dW5pdDoxMA=="),
            ("container", "dW5pdDoxMDc2OTA="),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id.to_string()))
        .collect();

        Self {
            default_unit_id: EACH_UNIT_ID.to_string(),
            units,
            leaf_levels: LEAF_LEVELS.to_vec(),
            page_size: PageSize::default(),
            validation: Validation::default(),
            messages: Messages::default(),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            locations: 10,
            recipes: 10,
            ingredients: 50,
            vendor_items: 100,
        }
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            min_quantity: 0.01,
            max_quantity: 10_000.0,
            max_name_length: 100,
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            cannot_produce: "URGENT: Cannot produce requested quantity".to_string(),
            setup_vendor_items: "Set up vendor items for missing ingredients".to_string(),
            restock: "Restock ingredients with insufficient inventory".to_string(),
            negative_inventory: "Investigate negative inventory levels - possible tracking issues"
                .to_string(),
            production_possible: "Production possible with current inventory".to_string(),
            monitor_stock: "Monitor stock levels during production".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Map a unit name (e.g. "kg") to its id; anything unrecognized is taken as an id
    pub fn resolve_unit<'a>(&'a self, unit: Option<&'a str>) -> &'a str {
        match unit {
            None => &self.default_unit_id,
            Some(name) => self.units.get(name).map(String::as_str).unwrap_or(name),
        }
    }
}
