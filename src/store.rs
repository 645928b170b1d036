//! Collection Store
//!
//! Owns the working collection, the baseline snapshot captured at the last
//! full load, and the set of records flagged for side-by-side comparison.
//!
//! The baseline is written only by [`CatalogStore::load`] and
//! [`CatalogStore::reset`]; every other mutation touches `current` alone,
//! which is what gives the change diff its reference point.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::diff::{diff, ChangeSet};
use crate::enrich::Enricher;
use crate::error::{CatalogError, Result};
use crate::normalize::{format_timestamp, tidy_identity};
use crate::record::TabletRecord;
use crate::schema::Field;

/// What [`CatalogStore::revert`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// The baseline version replaced the working one
    Restored,
    /// The record was added this session and has been dropped
    Removed,
}

/// In-memory tablet collection with a baseline for change tracking
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    current: Vec<TabletRecord>,
    baseline: Vec<TabletRecord>,
    flagged: BTreeSet<String>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store loaded from `inputs`
    pub fn from_inputs(inputs: &[Value]) -> Self {
        let mut store = Self::new();
        store.load(inputs);
        store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn current(&self) -> &[TabletRecord] {
        &self.current
    }

    pub fn baseline(&self) -> &[TabletRecord] {
        &self.baseline
    }

    pub fn flagged(&self) -> &BTreeSet<String> {
        &self.flagged
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TabletRecord> {
        self.current.iter().find(|r| r.id() == id)
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.flagged.contains(id)
    }

    /// Flagged records in collection order
    pub fn flagged_records(&self) -> Vec<&TabletRecord> {
        self.current
            .iter()
            .filter(|r| self.flagged.contains(r.id()))
            .collect()
    }

    /// Changes of the working collection against the baseline
    pub fn changes(&self) -> ChangeSet<'_> {
        diff(&self.current, &self.baseline)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace the collection and the baseline with the enriched `inputs`
    pub fn load(&mut self, inputs: &[Value]) {
        let records = Enricher::new().enrich(inputs);
        self.baseline = records.clone();
        self.current = records;
        self.flagged.clear();
        info!(count = self.current.len(), "catalog loaded");
    }

    pub fn reset(&mut self) {
        self.current.clear();
        self.baseline.clear();
        self.flagged.clear();
        debug!("catalog reset");
    }

    /// Enrich and append a new record; returns its identifier
    pub fn add(&mut self, partial: &Value) -> String {
        let record = Enricher::new().enrich_one(partial);
        let id = record.id().to_string();
        debug!(id = %id, "record added");
        self.current.push(record);
        id
    }

    /// Re-normalize identity fields, re-enrich `record` and replace the entry
    /// with the same identifier
    pub fn update(&mut self, record: TabletRecord) -> Result<()> {
        let index = self.position(record.id())?;
        self.replace_at(index, record);
        Ok(())
    }

    /// Re-enrich `record` and replace the entry at `index`
    pub fn update_at(&mut self, index: usize, record: TabletRecord) -> Result<()> {
        if index >= self.current.len() {
            return Err(CatalogError::IndexOutOfRange {
                index,
                len: self.current.len(),
            });
        }
        self.replace_at(index, record);
        Ok(())
    }

    /// Undo every edit to a record.
    ///
    /// A record with a baseline version gets that version back verbatim,
    /// derived fields included; it is re-inserted if it had been removed.
    /// A record added this session is dropped.
    pub fn revert(&mut self, id: &str) -> Result<RevertOutcome> {
        let original = self.baseline.iter().find(|r| r.id() == id).cloned();
        let position = self.current.iter().position(|r| r.id() == id);

        match (original, position) {
            (Some(original), Some(index)) => {
                self.current[index] = original;
                debug!(id, "record reverted to baseline");
                Ok(RevertOutcome::Restored)
            }
            (Some(original), None) => {
                self.current.push(original);
                debug!(id, "removed record restored from baseline");
                Ok(RevertOutcome::Restored)
            }
            (None, Some(index)) => {
                self.current.remove(index);
                self.flagged.remove(id);
                debug!(id, "added record reverted away");
                Ok(RevertOutcome::Removed)
            }
            (None, None) => Err(CatalogError::RecordNotFound { id: id.to_string() }),
        }
    }

    /// Drop a record from the working collection and from the flagged set
    pub fn remove(&mut self, id: &str) -> Result<TabletRecord> {
        let index = self.position(id)?;
        self.flagged.remove(id);
        debug!(id, "record removed");
        Ok(self.current.remove(index))
    }

    /// Toggle comparison membership; returns whether the id is now flagged
    pub fn toggle_flag(&mut self, id: &str) -> bool {
        if self.flagged.remove(id) {
            false
        } else {
            self.flagged.insert(id.to_string());
            true
        }
    }

    pub fn clear_flags(&mut self) {
        self.flagged.clear();
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.current
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CatalogError::RecordNotFound { id: id.to_string() })
    }

    fn replace_at(&mut self, index: usize, mut record: TabletRecord) {
        let enricher = Enricher::new();
        tidy_identity(&mut record);
        let mut record = enricher.refresh(record);
        record.set(Field::ModifiedDate, format_timestamp(enricher.now()));
        debug!(id = record.id(), index, "record updated");
        self.current[index] = record;
    }
}
