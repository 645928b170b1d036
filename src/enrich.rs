//! Enrichment Pipeline
//!
//! Normalizes input and derives the calculated fields. Derived values are
//! recomputed on every pass; a supplied value is only kept when the
//! computation has nothing to work with. A failed computation never stops the
//! remaining fields or records.

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

use crate::geometry::{calculate_area, calculate_aspect_ratio, calculate_diagonal, parse_dimensions};
use crate::normalize::normalize_at;
use crate::record::TabletRecord;
use crate::schema::Field;
use crate::units::mm_to_in;

/// Derives calculated fields against a fixed reference time
#[derive(Debug, Clone, Copy)]
pub struct Enricher {
    now: DateTime<Utc>,
}

impl Default for Enricher {
    fn default() -> Self {
        Self::new()
    }
}

impl Enricher {
    /// Enricher pinned to the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Enricher pinned to `now` (used for timestamps and model age)
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Normalize and enrich a batch
    pub fn enrich(&self, inputs: &[Value]) -> Vec<TabletRecord> {
        let records: Vec<_> = inputs.iter().map(|input| self.enrich_one(input)).collect();
        debug!(count = records.len(), "enriched batch");
        records
    }

    /// Normalize and enrich a single input object
    pub fn enrich_one(&self, input: &Value) -> TabletRecord {
        self.refresh(normalize_at(input, self.now))
    }

    /// Recompute the derived fields of an already normalized record
    pub fn refresh(&self, mut record: TabletRecord) -> TabletRecord {
        let derived = [
            (Field::DisplayPixelDensity, pixel_density(&record)),
            (Field::DigitizerDiagonal, digitizer_diagonal(&record)),
            (Field::DigitizerArea, digitizer_area(&record)),
            (Field::ModelAge, model_age(&record, self.now.year())),
            (Field::DigitizerAspectRatio, digitizer_aspect_ratio(&record)),
        ];

        for (field, value) in derived {
            if let Some(value) = value {
                record.set(field, value);
            }
        }

        record
    }
}

/// Normalize and enrich a batch against the current time
pub fn enrich(inputs: &[Value]) -> Vec<TabletRecord> {
    Enricher::new().enrich(inputs)
}

/// Normalize and enrich one input against the current time
pub fn enrich_one(input: &Value) -> TabletRecord {
    Enricher::new().enrich_one(input)
}

// =============================================================================
// Derivations
// =============================================================================

fn display_size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)^\s*(\d+(?:\.\d+)?)\s*(?:"|''|”|in|inch|inches)?(?:\s*$|\s*[(,;/])"#)
            .expect("display size pattern is valid")
    })
}

/// Display diagonal in inches from a size string such as `13.3"`, optionally
/// followed by a note like `(33.8 cm)`
fn parse_display_size(raw: &str) -> Option<f64> {
    let captures = display_size_pattern().captures(raw)?;
    let inches: f64 = captures.get(1)?.as_str().parse().ok()?;
    (inches.is_finite() && inches > 0.0).then_some(inches)
}

/// Rounded pixels per inch from the display resolution and a physical
/// diagonal (the display size, else the digitizer area converted to inches)
fn pixel_density(record: &TabletRecord) -> Option<String> {
    let pixels = parse_dimensions(record.get(Field::DisplayResolution)?)?;

    let inches = record
        .get(Field::DisplaySize)
        .and_then(parse_display_size)
        .or_else(|| {
            let mm = parse_dimensions(record.get(Field::DigitizerDimensions)?)?;
            Some(mm_to_in(calculate_diagonal(&mm)))
        })?;

    if inches <= 0.0 {
        return None;
    }

    let density = (calculate_diagonal(&pixels) / inches).round();
    density.is_finite().then(|| format!("{}", density as i64))
}

fn digitizer_diagonal(record: &TabletRecord) -> Option<String> {
    let dims = parse_dimensions(record.get(Field::DigitizerDimensions)?)?;
    Some(format!("{:.2}", calculate_diagonal(&dims)))
}

fn digitizer_area(record: &TabletRecord) -> Option<String> {
    let dims = parse_dimensions(record.get(Field::DigitizerDimensions)?)?;
    Some(format!("{:.2}", calculate_area(&dims)))
}

fn digitizer_aspect_ratio(record: &TabletRecord) -> Option<String> {
    let dims = parse_dimensions(record.get(Field::DigitizerDimensions)?)?;
    calculate_aspect_ratio(&dims)
}

fn model_age(record: &TabletRecord, current_year: i32) -> Option<String> {
    let launch_year = parse_leading_integer(record.get(Field::ModelLaunchYear)?)?;
    i64::from(current_year).checked_sub(launch_year).map(|age| age.to_string())
}

/// Integer prefix of a string after leading whitespace (`"2019 (EU)"` -> 2019)
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}
