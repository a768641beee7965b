//! Recipe inventory sufficiency analysis
//!
//! Determines whether a location holds enough stocked ingredients to
//! produce a target quantity of a recipe.

pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod resolver;
pub mod sample;
pub mod scaler;
pub mod supply;

pub use analyzer::{InventoryAnalyzer, InventoryReport};
pub use catalog::{RecipeCatalog, ScaledTreeRequest};
pub use config::AnalyzerConfig;
pub use db::SqliteCatalog;
pub use error::{AnalysisError, CatalogError, ConfigError};
