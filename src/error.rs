//! Error types for catalog queries and inventory analysis

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a [`crate::catalog::RecipeCatalog`] implementation
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed catalog data: {0}")]
    Malformed(String),

    #[error("Not found in catalog: {0}")]
    NotFound(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Cannot convert between units {from} and {to}")]
    IncompatibleUnits { from: String, to: String },

    #[error("Maximum recipe depth exceeded - possible cycle through recipe {0}")]
    RecipeCycle(String),
}

/// Failures loading an analyzer configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Location,
    Recipe,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Location => write!(f, "Location"),
            EntityKind::Recipe => write!(f, "Recipe"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: EntityKind, name: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Upstream(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
