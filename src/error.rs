//! Error types for the tablet catalog

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog errors
///
/// Normalization, enrichment and the query engines are total and never
/// produce these. Only the import gate, store lookups and parameter
/// validation do.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Import rejected: {0}")]
    ImportRejected(String),

    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Record index {index} out of range (collection has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("Invalid sort criterion: {0}")]
    InvalidSortCriterion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
