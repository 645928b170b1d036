//! Export Projector
//!
//! Projects records back into the external document shape:
//! `{"DrawingTablets": [ { "Brand": ..., "_id": ... }, ... ]}`.
//!
//! Output is byte-stable for a given collection: records are ordered by
//! brand, model id and identifier, and keys within a record are sorted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

use crate::checksum::ExportDigest;
use crate::error::Result;
use crate::record::TabletRecord;
use crate::schema::Field;
use crate::text::fold;

/// Property holding the record array in exported documents
pub const EXPORT_ARRAY_PROPERTY: &str = "DrawingTablets";

/// What the projection keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Keep calculated fields
    pub include_calculated: bool,
    /// Write every field, missing ones as ""
    pub include_empty: bool,
    /// Single-line JSON instead of two-space indentation
    pub compact: bool,
}

/// One record as an external object with lexicographically sorted keys
pub fn project(record: &TabletRecord, options: &ExportOptions) -> Map<String, Value> {
    // serde_json's default Map is ordered by key.
    let mut object = Map::new();

    for field in Field::all() {
        if field.is_calculated() && !options.include_calculated {
            continue;
        }
        let value = record.get(field).unwrap_or("");
        if value.is_empty() && !options.include_empty {
            continue;
        }
        object.insert(field.external_name(), Value::String(value.to_string()));
    }

    object
}

/// Records in export order: brand, model id, then identifier, case-folded
pub fn export_order(records: &[TabletRecord]) -> Vec<&TabletRecord> {
    let mut keyed: Vec<((String, String, String), &TabletRecord)> = records
        .iter()
        .map(|record| {
            let key = (
                fold(record.brand().unwrap_or("")),
                fold(record.model_id().unwrap_or("")),
                fold(record.id()),
            );
            (key, record)
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    keyed.into_iter().map(|(_, record)| record).collect()
}

/// The full export document
pub fn to_document(records: &[TabletRecord], options: &ExportOptions) -> Value {
    let projected: Vec<Value> = export_order(records)
        .into_iter()
        .map(|record| Value::Object(project(record, options)))
        .collect();

    let mut document = Map::new();
    document.insert(EXPORT_ARRAY_PROPERTY.to_string(), Value::Array(projected));
    Value::Object(document)
}

/// The export document as text
pub fn export_catalog(records: &[TabletRecord], options: &ExportOptions) -> Result<String> {
    let document = to_document(records, options);
    let text = if options.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    Ok(text)
}

/// Write the export document to `path` and return its digest
pub fn write_catalog(path: &Path, records: &[TabletRecord], options: &ExportOptions) -> Result<ExportDigest> {
    let text = export_catalog(records, options)?;
    std::fs::write(path, &text)?;
    let digest = ExportDigest::of(&text);
    info!(path = %path.display(), records = records.len(), digest = digest.short(), "catalog exported");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich_one;
    use crate::normalize::normalize;
    use serde_json::json;

    fn sample() -> TabletRecord {
        enrich_one(&json!({
            "_id": "rec-1",
            "_CreateDate": "2024-01-01T00:00:00.000Z",
            "_ModifiedDate": "2024-01-02T00:00:00.000Z",
            "Brand": "Wacom",
            "ModelId": "PTH-660",
            "ModelName": "Intuos Pro M",
            "ModelType": "Pen Tablet",
            "ModelLaunchYear": "2017",
            "DigitizerDimensions": "224 x 148",
            "DigitizerPressureLevels": "8192",
            "ModelFamily": ""
        }))
    }

    #[test]
    fn test_project_skips_calculated_and_empty() {
        let object = project(&sample(), &ExportOptions::default());

        assert_eq!(object["ModelBrand"], "Wacom");
        assert_eq!(object["_id"], "rec-1");
        assert_eq!(object["_CreateDate"], "2024-01-01T00:00:00.000Z");
        assert!(!object.contains_key("DigitizerDiagonal"));
        assert!(!object.contains_key("ModelAge"));
        assert!(!object.contains_key("ModelFamily"));
        assert!(!object.contains_key("DisplaySize"));
    }

    #[test]
    fn test_project_keys_are_sorted() {
        let object = project(&sample(), &ExportOptions::default());
        let keys: Vec<&String> = object.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_project_with_calculated_and_empty() {
        let options = ExportOptions {
            include_calculated: true,
            include_empty: true,
            compact: false,
        };
        let object = project(&sample(), &options);
        assert_eq!(object.len(), Field::all().count());
        assert_eq!(object["DigitizerDiagonal"], "268.48");
        assert_eq!(object["DisplaySize"], "");
        assert_eq!(object["ModelFamily"], "");
    }

    #[test]
    fn test_round_trip_through_normalizer() {
        let record = sample();
        let options = ExportOptions::default();
        let exported = project(&record, &options);
        let reimported = normalize(&Value::Object(exported.clone()));
        assert_eq!(project(&reimported, &options), exported);
    }

    #[test]
    fn test_export_order_and_wrapper() {
        let records = vec![
            enrich_one(&json!({ "_id": "3", "Brand": "wacom", "ModelId": "B" })),
            enrich_one(&json!({ "_id": "2", "Brand": "Huion", "ModelId": "Z" })),
            enrich_one(&json!({ "_id": "1", "Brand": "Wacom", "ModelId": "a" })),
        ];
        let document = to_document(&records, &ExportOptions::default());
        let ids: Vec<&str> = document[EXPORT_ARRAY_PROPERTY]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_export_is_byte_stable() {
        let records = vec![sample()];
        let options = ExportOptions::default();
        let first = export_catalog(&records, &options).unwrap();
        let second = export_catalog(&records, &options).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("{\n  \"DrawingTablets\": [\n    {"));

        let compact = export_catalog(&records, &ExportOptions { compact: true, ..options }).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_write_catalog_digest_matches_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let digest = write_catalog(&path, &[sample()], &ExportOptions::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(digest.verify(&written));
    }
}
