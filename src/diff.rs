//! Change-Diff Engine
//!
//! Classifies the working collection against the baseline snapshot by record
//! identifier: added, modified (with per-field changes) and removed.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::record::TabletRecord;
use crate::schema::Field;

/// Rendering for an empty side of a change
pub const EMPTY_MARKER: &str = "-";

/// One field that differs between baseline and current
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: Field,
    pub old_value: String,
    pub new_value: String,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.old_value, self.new_value)
    }
}

/// A record present in both collections with at least one changed field
#[derive(Debug, Clone, Serialize)]
pub struct ModifiedRecord<'a> {
    pub record: &'a TabletRecord,
    pub changes: Vec<FieldChange>,
}

/// Result of comparing current against baseline
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet<'a> {
    /// In current, not in baseline (current order)
    pub added: Vec<&'a TabletRecord>,
    /// In both, with differences (current order)
    pub modified: Vec<ModifiedRecord<'a>>,
    /// In baseline, not in current (baseline order)
    pub removed: Vec<&'a TabletRecord>,
}

impl ChangeSet<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// Compare `current` against `baseline`
pub fn diff<'a>(current: &'a [TabletRecord], baseline: &'a [TabletRecord]) -> ChangeSet<'a> {
    let baseline_by_id: HashMap<&str, &TabletRecord> = baseline.iter().map(|r| (r.id(), r)).collect();
    let mut changes = ChangeSet::default();

    for record in current {
        match baseline_by_id.get(record.id()) {
            None => changes.added.push(record),
            Some(original) => {
                let field_changes = diff_record(record, original);
                if !field_changes.is_empty() {
                    changes.modified.push(ModifiedRecord {
                        record,
                        changes: field_changes,
                    });
                }
            }
        }
    }

    let current_ids: HashSet<&str> = current.iter().map(TabletRecord::id).collect();
    changes.removed = baseline
        .iter()
        .filter(|r| !current_ids.contains(r.id()))
        .collect();

    changes
}

/// Field-level differences between two versions of a record.
///
/// `ModifiedDate` is ignored; it changes on every edit and says nothing
/// about content. Values compare trimmed, with a missing value equal to "".
pub fn diff_record(current: &TabletRecord, original: &TabletRecord) -> Vec<FieldChange> {
    Field::all()
        .filter(|field| *field != Field::ModifiedDate)
        .filter_map(|field| {
            let new_value = current.get(field).unwrap_or("").trim();
            let old_value = original.get(field).unwrap_or("").trim();
            (new_value != old_value).then(|| FieldChange {
                field,
                old_value: render(old_value),
                new_value: render(new_value),
            })
        })
        .collect()
}

fn render(value: &str) -> String {
    if value.is_empty() {
        EMPTY_MARKER.to_string()
    } else {
        value.to_string()
    }
}
