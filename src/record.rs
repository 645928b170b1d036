//! The canonical tablet record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::Field;

/// Default for identity fields the input never supplied
pub const UNKNOWN: &str = "Unknown";

/// A normalized tablet specification.
///
/// Identity and timestamps are always present. Every domain attribute is an
/// optional raw string; numeric meaning is read off at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TabletRecord {
    id: String,
    create_date: String,
    modified_date: String,
    values: BTreeMap<Field, String>,
}

impl TabletRecord {
    /// Create an empty record with the given identity and timestamps
    pub fn new(id: impl Into<String>, create_date: impl Into<String>, modified_date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            create_date: create_date.into(),
            modified_date: modified_date.into(),
            values: BTreeMap::new(),
        }
    }

    /// Stable opaque identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn create_date(&self) -> &str {
        &self.create_date
    }

    pub fn modified_date(&self) -> &str {
        &self.modified_date
    }

    /// Raw value of a field, system fields included
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Id => Some(&self.id),
            Field::CreateDate => Some(&self.create_date),
            Field::ModifiedDate => Some(&self.modified_date),
            _ => self.values.get(&field).map(String::as_str),
        }
    }

    /// Raw value looked up by canonical, legacy or system-prefixed name.
    /// Unknown names have no value.
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        Field::from_name(name).and_then(|field| self.get(field))
    }

    /// Value of a field when it is present and not blank
    pub fn get_non_empty(&self, field: Field) -> Option<&str> {
        self.get(field).filter(|value| !value.trim().is_empty())
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Id => self.id = value,
            Field::CreateDate => self.create_date = value,
            Field::ModifiedDate => self.modified_date = value,
            _ => {
                self.values.insert(field, value);
            }
        }
    }

    /// Clear a domain field. System fields cannot be cleared.
    pub fn clear(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Present fields with their raw values, in registry order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::all().filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    pub fn model_id(&self) -> Option<&str> {
        self.get(Field::ModelId)
    }

    pub fn brand(&self) -> Option<&str> {
        self.get(Field::ModelBrand)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.get(Field::ModelName)
    }

    pub fn model_type(&self) -> Option<&str> {
        self.get(Field::ModelType)
    }

    /// Short human label: "Brand Name (ModelId)"
    pub fn label(&self) -> String {
        let brand = self.brand().unwrap_or(UNKNOWN);
        let name = self.model_name().unwrap_or(UNKNOWN);
        match self.model_id() {
            Some(model_id) => format!("{} {} ({})", brand, name, model_id),
            None => format!("{} {}", brand, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TabletRecord {
        let mut record = TabletRecord::new("abc", "2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z");
        record.set(Field::ModelBrand, "Wacom");
        record.set(Field::ModelName, "Intuos Pro");
        record.set(Field::ModelId, "PTH-660");
        record
    }

    #[test]
    fn test_get_system_and_domain_fields() {
        let record = sample();
        assert_eq!(record.get(Field::Id), Some("abc"));
        assert_eq!(record.get(Field::ModifiedDate), Some("2024-01-02T00:00:00Z"));
        assert_eq!(record.get(Field::ModelBrand), Some("Wacom"));
        assert_eq!(record.get(Field::DisplaySize), None);
    }

    #[test]
    fn test_get_by_name_resolves_aliases() {
        let record = sample();
        assert_eq!(record.get_by_name("Brand"), Some("Wacom"));
        assert_eq!(record.get_by_name("_id"), Some("abc"));
        assert_eq!(record.get_by_name("NotAField"), None);
    }

    #[test]
    fn test_set_and_clear() {
        let mut record = sample();
        record.set(Field::Id, "xyz");
        assert_eq!(record.id(), "xyz");

        record.set(Field::DisplaySize, " ");
        assert!(record.contains(Field::DisplaySize));
        assert_eq!(record.get_non_empty(Field::DisplaySize), None);

        assert_eq!(record.clear(Field::DisplaySize), Some(" ".to_string()));
        assert_eq!(record.clear(Field::Id), None);
        assert_eq!(record.id(), "xyz");
    }

    #[test]
    fn test_fields_in_registry_order() {
        let record = sample();
        let names: Vec<_> = record.fields().map(|(field, _)| field.name()).collect();
        assert_eq!(names, vec!["id", "CreateDate", "ModifiedDate", "ModelBrand", "ModelId", "ModelName"]);
    }

    #[test]
    fn test_label() {
        assert_eq!(sample().label(), "Wacom Intuos Pro (PTH-660)");
    }
}
