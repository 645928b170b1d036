//! Data-Quality Auditor
//!
//! Scans a collection and reports problems a curator should fix by hand.
//!
//! ## Rules
//! 1. **missing-field** (critical): model id, name, brand or type absent, or
//!    still the `"Unknown"` default
//! 2. **duplicate-id** (critical): one warning per occurrence of a model id
//!    shared by two or more records
//! 3. **whitespace**: leading/trailing whitespace in any value
//! 4. **schema-mismatch**: display-only values on a tablet without a display
//! 5. **invalid-format**: obviously non-numeric text (no digit at all) in a
//!    numeric field
//!
//! Warnings come back critical first, then by model id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

use crate::record::{TabletRecord, UNKNOWN};
use crate::schema::Field;
use crate::text::collate;

/// Type label of tablets without a screen
pub const DEFAULT_NON_DISPLAY_TYPE: &str = "Pen Tablet";

/// Fields that only make sense on a device with a screen
const DISPLAY_ONLY_FIELDS: [Field; 10] = [
    Field::DisplayResolution,
    Field::DisplaySize,
    Field::DisplayViewingAngle,
    Field::DisplayColorBitDepth,
    Field::DisplayContrast,
    Field::DisplayResponseTime,
    Field::DisplayColorGamut,
    Field::DisplayBrightness,
    Field::DisplayRefreshRate,
    Field::DisplayPanelTech,
];

/// Values that mean "no display value" rather than a real one
const DISPLAY_PLACEHOLDERS: [&str; 3] = ["n/a", "-", "none"];

/// Fields expected to contain a number somewhere in their text
const NUMERIC_FIELDS: [Field; 15] = [
    Field::ModelLaunchYear,
    Field::DigitizerPressureLevels,
    Field::DigitizerReportRate,
    Field::DigitizerResolution,
    Field::DisplayResolution,
    Field::DigitizerTilt,
    Field::DisplayRefreshRate,
    Field::DisplayBrightness,
    Field::DisplayResponseTime,
    Field::PhysicalWeight,
    Field::DigitizerMaxHover,
    Field::DisplayPixelDensity,
    Field::DisplaySize,
    Field::DisplayContrast,
    Field::PhysicalWeightWithStand,
];

/// Accepted stand-ins for a numeric value that is not known
const NUMERIC_PLACEHOLDERS: [&str; 5] = ["n/a", "unknown", "-", "tbd", "none"];

// =============================================================================
// Warning types
// =============================================================================

/// Warning severity; critical sorts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    MissingField,
    DuplicateId,
    Whitespace,
    SchemaMismatch,
    InvalidFormat,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "missing-field",
            Self::DuplicateId => "duplicate-id",
            Self::Whitespace => "whitespace",
            Self::SchemaMismatch => "schema-mismatch",
            Self::InvalidFormat => "invalid-format",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingField | Self::DuplicateId => Severity::Critical,
            Self::Whitespace | Self::SchemaMismatch | Self::InvalidFormat => Severity::Warning,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One data-quality finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Position of the record in the audited collection
    pub index: usize,
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (#{} {})",
            self.severity,
            self.category,
            self.message,
            self.index,
            self.model_id.as_deref().unwrap_or(&self.record_id)
        )
    }
}

/// Counts over an audit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub by_category: BTreeMap<Category, usize>,
}

/// Result of auditing a collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditReport {
    pub warnings: Vec<AuditWarning>,
    pub stats: AuditStats,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn has_critical(&self) -> bool {
        self.stats.critical > 0
    }

    /// Warnings attached to one record
    pub fn for_record<'a>(&'a self, record_id: &'a str) -> impl Iterator<Item = &'a AuditWarning> + 'a {
        self.warnings.iter().filter(move |w| w.record_id == record_id)
    }
}

// =============================================================================
// Auditor
// =============================================================================

/// The collection auditor
#[derive(Debug, Clone)]
pub struct Auditor {
    non_display_type: String,
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new(DEFAULT_NON_DISPLAY_TYPE)
    }
}

impl Auditor {
    /// Auditor treating records of `non_display_type` as screenless
    pub fn new(non_display_type: impl Into<String>) -> Self {
        Self {
            non_display_type: non_display_type.into(),
        }
    }

    /// Audit every record and rank the findings
    pub fn audit(&self, records: &[TabletRecord]) -> AuditReport {
        let mut warnings = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let mut sink = WarningSink {
                index,
                record,
                warnings: &mut warnings,
            };
            check_missing_fields(&mut sink);
            check_whitespace(&mut sink);
            self.check_display_fields(&mut sink);
            check_numeric_formats(&mut sink);
        }

        check_duplicate_ids(records, &mut warnings);

        warnings.sort_by(|a, b| {
            a.severity.cmp(&b.severity).then_with(|| {
                collate(
                    a.model_id.as_deref().unwrap_or(""),
                    b.model_id.as_deref().unwrap_or(""),
                )
            })
        });

        let stats = summarize(&warnings);
        debug!(
            records = records.len(),
            critical = stats.critical,
            warning = stats.warning,
            "audit complete"
        );

        AuditReport { warnings, stats }
    }

    fn check_display_fields(&self, sink: &mut WarningSink<'_>) {
        let is_screenless = sink
            .record
            .model_type()
            .map(|t| t.trim().eq_ignore_ascii_case(&self.non_display_type))
            .unwrap_or(false);
        if !is_screenless {
            return;
        }

        for field in DISPLAY_ONLY_FIELDS {
            let Some(value) = sink.record.get_non_empty(field) else { continue };
            if is_placeholder(value, &DISPLAY_PLACEHOLDERS) {
                continue;
            }
            sink.push(
                Category::SchemaMismatch,
                Some(field),
                format!(
                    "{} has display value for '{}' ({}) but is a {}",
                    sink.record.label(),
                    field,
                    value,
                    self.non_display_type
                ),
            );
        }
    }
}

/// Audit with the default settings
pub fn audit(records: &[TabletRecord]) -> AuditReport {
    Auditor::default().audit(records)
}

/// Per-record warning collector
struct WarningSink<'a> {
    index: usize,
    record: &'a TabletRecord,
    warnings: &'a mut Vec<AuditWarning>,
}

impl WarningSink<'_> {
    fn push(&mut self, category: Category, field: Option<Field>, message: String) {
        self.warnings.push(warning(self.index, self.record, category, field, message));
    }
}

fn warning(
    index: usize,
    record: &TabletRecord,
    category: Category,
    field: Option<Field>,
    message: String,
) -> AuditWarning {
    AuditWarning {
        severity: category.severity(),
        category,
        message,
        index,
        record_id: record.id().to_string(),
        model_id: model_id_of(record).map(str::to_string),
        field,
    }
}

fn model_id_of(record: &TabletRecord) -> Option<&str> {
    record.get_non_empty(Field::ModelId)
}

fn check_missing_fields(sink: &mut WarningSink<'_>) {
    if model_id_of(sink.record).is_none() {
        sink.push(
            Category::MissingField,
            Some(Field::ModelId),
            format!("Record #{} has no model id", sink.index),
        );
    }

    for field in [Field::ModelName, Field::ModelBrand, Field::ModelType] {
        let missing = match sink.record.get_non_empty(field) {
            None => true,
            Some(value) => value.trim() == UNKNOWN,
        };
        if missing {
            sink.push(
                Category::MissingField,
                Some(field),
                format!("{} is missing '{}'", sink.record.label(), field),
            );
        }
    }
}

fn check_whitespace(sink: &mut WarningSink<'_>) {
    let offending: Vec<(Field, String)> = sink
        .record
        .fields()
        .filter(|(_, value)| value.trim() != *value)
        .map(|(field, value)| (field, value.to_string()))
        .collect();

    for (field, value) in offending {
        sink.push(
            Category::Whitespace,
            Some(field),
            format!("'{}' has leading or trailing whitespace: {:?}", field, value),
        );
    }
}

fn check_numeric_formats(sink: &mut WarningSink<'_>) {
    for field in NUMERIC_FIELDS {
        let Some(value) = sink.record.get_non_empty(field) else { continue };
        if is_placeholder(value, &NUMERIC_PLACEHOLDERS) || value.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        sink.push(
            Category::InvalidFormat,
            Some(field),
            format!("'{}' should be numeric but is {:?}", field, value),
        );
    }
}

/// Second pass: every occurrence of a model id used more than once
fn check_duplicate_ids(records: &[TabletRecord], warnings: &mut Vec<AuditWarning>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for model_id in records.iter().filter_map(model_id_of) {
        *counts.entry(model_id).or_insert(0) += 1;
    }

    for (index, record) in records.iter().enumerate() {
        let Some(model_id) = model_id_of(record) else { continue };
        let count = counts.get(model_id).copied().unwrap_or(0);
        if count > 1 {
            warnings.push(warning(
                index,
                record,
                Category::DuplicateId,
                Some(Field::ModelId),
                format!("Model id '{}' is used by {} records", model_id, count),
            ));
        }
    }
}

fn is_placeholder(value: &str, placeholders: &[&str]) -> bool {
    let value = value.trim();
    placeholders.iter().any(|p| value.eq_ignore_ascii_case(p))
}

fn summarize(warnings: &[AuditWarning]) -> AuditStats {
    let mut stats = AuditStats {
        total: warnings.len(),
        ..Default::default()
    };
    for warning in warnings {
        match warning.severity {
            Severity::Critical => stats.critical += 1,
            Severity::Warning => stats.warning += 1,
        }
        *stats.by_category.entry(warning.category).or_insert(0) += 1;
    }
    stats
}
