//! Sort Engine
//!
//! Multi-key stable ordering. Criteria are evaluated in list order; ties fall
//! through to the next criterion and a full tie keeps input order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, Result};
use crate::geometry::parse_dimensions;
use crate::record::TabletRecord;
use crate::schema::Field;
use crate::text::fold;
use crate::units::parse_lenient_number;

/// Sort key for a missing or unparseable numeric value; sorts before every
/// real value in ascending order.
pub const MISSING_NUMBER: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

/// One sort key; earlier criteria take precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Check the criterion names a known field
    pub fn validate(&self) -> Result<Field> {
        Field::from_name(&self.field)
            .ok_or_else(|| CatalogError::InvalidSortCriterion(format!("unknown field '{}'", self.field)))
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.field, direction)
    }
}

/// Parses `FIELD`, `FIELD:asc` or `FIELD:desc`
impl FromStr for SortCriterion {
    type Err = CatalogError;

    fn from_str(spec: &str) -> Result<Self> {
        match spec.split_once(':') {
            None => Ok(Self::asc(spec)),
            Some((field, direction)) => match direction.to_ascii_lowercase().as_str() {
                "asc" | "ascending" => Ok(Self::asc(field)),
                "desc" | "descending" => Ok(Self::desc(field)),
                other => Err(CatalogError::InvalidSortCriterion(format!(
                    "unknown direction '{}' for '{}'",
                    other, field
                ))),
            },
        }
    }
}

// =============================================================================
// Keys
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys for one criterion share a variant; keep the order total anyway.
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }
}

fn sort_key(record: &TabletRecord, field_name: &str) -> SortKey {
    let field = Field::from_name(field_name);
    let number = |raw: Option<&str>| SortKey::Number(raw.and_then(parse_lenient_number).unwrap_or(MISSING_NUMBER));

    match field {
        Some(Field::ModelLaunchYear) | Some(Field::ModelAge) | Some(Field::DigitizerDiagonal) => {
            number(field.and_then(|f| record.get(f)))
        }
        Some(Field::DigitizerAspectRatio) => SortKey::Number(
            record
                .get(Field::DigitizerDimensions)
                .and_then(parse_dimensions)
                .and_then(|dims| dims.ratio())
                .unwrap_or(MISSING_NUMBER),
        ),
        Some(field) => SortKey::Text(fold(record.get(field).unwrap_or(""))),
        None => SortKey::Text(String::new()),
    }
}

/// Order `records` by `criteria` without touching the input
pub fn sort<'a, I>(records: I, criteria: &[SortCriterion]) -> Vec<&'a TabletRecord>
where
    I: IntoIterator<Item = &'a TabletRecord>,
{
    let mut keyed: Vec<(Vec<SortKey>, &'a TabletRecord)> = records
        .into_iter()
        .map(|record| {
            let keys = criteria.iter().map(|c| sort_key(record, &c.field)).collect();
            (keys, record)
        })
        .collect();

    // `sort_by` is stable, which keeps input order on a full tie.
    keyed.sort_by(|(a, _), (b, _)| {
        criteria
            .iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(criterion, (ka, kb))| match criterion.direction {
                SortDirection::Ascending => ka.compare(kb),
                SortDirection::Descending => kb.compare(ka),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}
