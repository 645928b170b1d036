//! Record Normalizer
//!
//! Maps an arbitrary JSON object onto the canonical record shape. All alias
//! handling lives here and is driven entirely by the field registry:
//!
//! 1. exact canonical key
//! 2. each legacy alias, in declared order
//! 3. for system fields, the underscore-prefixed canonical key
//!
//! The first hit wins. Normalization never fails; malformed input degrades to
//! defaults.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::record::{TabletRecord, UNKNOWN};
use crate::schema::{registry, Field, FieldDescriptor, SYSTEM_PREFIX};

/// Identity fields whose values are trimmed on the way in. Whitespace in any
/// other field is left for the auditor to report.
const TRIMMED_FIELDS: [Field; 4] = [Field::ModelName, Field::ModelFamily, Field::ModelBrand, Field::ModelType];

/// Identity fields defaulted to [`UNKNOWN`] when unresolved
const DEFAULTED_FIELDS: [Field; 3] = [Field::ModelName, Field::ModelBrand, Field::ModelType];

/// A fresh record identifier: a random (v4) UUID from the OS generator
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// ISO-8601 timestamp in the form records carry (`2024-05-01T12:00:00.000Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize `input`, stamping missing timestamps with the current time
pub fn normalize(input: &Value) -> TabletRecord {
    normalize_at(input, Utc::now())
}

/// Normalize `input`, stamping missing timestamps with `now`
pub fn normalize_at(input: &Value, now: DateTime<Utc>) -> TabletRecord {
    let empty = Map::new();
    let object = input.as_object().unwrap_or(&empty);

    let resolved: Vec<(Field, String)> = registry()
        .descriptors()
        .iter()
        .filter_map(|descriptor| resolve_value(object, descriptor).map(|raw| (descriptor.field, raw)))
        .collect();

    let lookup = |field: Field| resolved.iter().find(|(f, _)| *f == field).map(|(_, v)| v.clone());
    let timestamp = format_timestamp(now);

    let mut record = TabletRecord::new(
        lookup(Field::Id).unwrap_or_else(new_record_id),
        lookup(Field::CreateDate).unwrap_or_else(|| timestamp.clone()),
        lookup(Field::ModifiedDate).unwrap_or_else(|| timestamp.clone()),
    );

    for (field, value) in resolved {
        if !field.is_system() {
            record.set(field, value);
        }
    }

    tidy_identity(&mut record);
    record
}

/// Trim the identity fields and default the unresolved ones to [`UNKNOWN`].
/// Applied on every normalization and again whenever a record is edited.
pub fn tidy_identity(record: &mut TabletRecord) {
    for field in TRIMMED_FIELDS {
        let trimmed = match record.get(field) {
            Some(value) if value.trim() != value => value.trim().to_string(),
            _ => continue,
        };
        record.set(field, trimmed);
    }

    for field in DEFAULTED_FIELDS {
        if !record.contains(field) {
            record.set(field, UNKNOWN);
        }
    }
}

/// First value found for `descriptor` under its canonical, alias or prefixed key
fn resolve_value(object: &Map<String, Value>, descriptor: &FieldDescriptor) -> Option<String> {
    let prefixed = descriptor
        .is_system
        .then(|| format!("{}{}", SYSTEM_PREFIX, descriptor.name));

    let mut keys: Vec<&str> = Vec::with_capacity(descriptor.aliases.len() + 2);
    keys.push(descriptor.name);
    keys.extend(descriptor.aliases.iter().copied());
    if let Some(prefixed) = prefixed.as_deref() {
        keys.push(prefixed);
    }

    // A blank identifier or timestamp is no identity at all.
    keys.into_iter().find_map(|key| {
        object
            .get(key)
            .and_then(value_to_string)
            .filter(|value| !descriptor.is_system || !value.trim().is_empty())
    })
}

/// Scalars become their textual form. `null` counts as absent so the next
/// candidate key is tried.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
