//! Error types for rusty-inventory
//!
//! Two layers: [`InventoryError`] is fatal for a whole run (schema, config,
//! I/O), [`ModelError`] is local to one forecasting candidate of one SKU and
//! never escapes the forecast engine.

use crate::types::SkuId;
use thiserror::Error;

/// Main error type for rusty-inventory
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Schema validation failed: missing required column(s) {}", .missing.join(", "))]
    SchemaValidation { missing: Vec<String> },

    #[error("Invalid record for SKU '{sku_id}': {reason}")]
    InvalidRecord { sku_id: SkuId, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failure of a single forecasting candidate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{model}: insufficient history (requires {required} observations, got {available})")]
    InsufficientHistory {
        model: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{model}: fit failed: {reason}")]
    FitFailure { model: &'static str, reason: String },
}

impl ModelError {
    /// Name of the candidate model that failed
    pub fn model(&self) -> &'static str {
        match self {
            ModelError::InsufficientHistory { model, .. } => model,
            ModelError::FitFailure { model, .. } => model,
        }
    }
}

/// Result type alias for rusty-inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
