//! Import gate
//!
//! Locates the record array in an incoming JSON document and decides whether
//! it looks like a tablet catalog at all. This is the only place a document
//! is refused; everything past the gate is normalized leniently.
//!
//! Accepted shapes:
//! - a bare array of objects
//! - an object holding the array under the configured property
//!   (`DrawingTablets` by default), or failing that its first array-valued
//!   property

use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::error::{CatalogError, Result};
use crate::schema::Field;

/// Extract the record array from `document`
pub fn parse_catalog(document: &Value, config: &ImportConfig) -> Result<Vec<Value>> {
    let records = locate_array(document, &config.array_property).ok_or_else(|| {
        reject("document is neither an array nor an object holding an array".to_string())
    })?;

    let Some(first) = records.first() else {
        return Err(reject("the record array is empty".to_string()));
    };

    if config.require_brand_key && !has_brand_key(first) {
        return Err(reject(format!(
            "first record has no brand key (expected one of: {})",
            brand_keys().collect::<Vec<_>>().join(", ")
        )));
    }

    debug!(count = records.len(), "import accepted");
    Ok(records.clone())
}

/// Read and gate a catalog file with the default import settings
pub fn read_catalog(path: &Path) -> Result<Vec<Value>> {
    read_catalog_with(path, &ImportConfig::default())
}

/// Read and gate a catalog file
pub fn read_catalog_with(path: &Path, config: &ImportConfig) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    parse_catalog(&document, config).inspect_err(|e| warn!(path = %path.display(), "{}", e))
}

fn locate_array<'a>(document: &'a Value, property: &str) -> Option<&'a Vec<Value>> {
    match document {
        Value::Array(records) => Some(records),
        Value::Object(object) => object
            .get(property)
            .and_then(Value::as_array)
            .or_else(|| object.values().find_map(Value::as_array)),
        _ => None,
    }
}

fn brand_keys() -> impl Iterator<Item = &'static str> {
    let descriptor = Field::ModelBrand.descriptor();
    std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied())
}

fn has_brand_key(record: &Value) -> bool {
    record
        .as_object()
        .map(|object| brand_keys().any(|key| object.contains_key(key)))
        .unwrap_or(false)
}

fn reject(reason: String) -> CatalogError {
    CatalogError::ImportRejected(reason)
}
