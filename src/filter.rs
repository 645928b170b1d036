//! Filter Engine
//!
//! Free-text search plus a conjunction of typed field conditions. Filter
//! lists are plain parameters owned by the caller; nothing here holds state.
//!
//! ## Free text
//! The query splits into `"quoted phrases"` and bare words. Every token must
//! appear (case-folded) in the model name, model id or brand.
//!
//! ## Conditions
//! All conditions must hold. A record with no value for the targeted field
//! never matches. Numeric conditions read both sides with the lenient number
//! parser; equality allows an absolute difference of [`NUMERIC_TOLERANCE`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{CatalogError, Result};
use crate::record::TabletRecord;
use crate::schema::{Field, ValueKind};
use crate::text::fold;
use crate::units::parse_lenient_number;

pub const NUMERIC_TOLERANCE: f64 = 0.0001;

/// Fields searched by the free-text query
const SEARCHED_FIELDS: [Field; 3] = [Field::ModelName, Field::ModelId, Field::ModelBrand];

// =============================================================================
// Conditions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCondition {
    Equals,
    Contains,
    BeginsWith,
    EndsWith,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericCondition {
    Equals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Range,
}

/// Condition tag; the variant decides how values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "op", rename_all = "lowercase")]
pub enum Condition {
    Text(TextCondition),
    Numeric(NumericCondition),
}

impl Condition {
    pub fn kind(&self) -> ValueKind {
        match self {
            Condition::Text(_) => ValueKind::Text,
            Condition::Numeric(_) => ValueKind::Numeric,
        }
    }

    /// Short tag used on the command line
    pub fn tag(&self) -> &'static str {
        match self {
            Condition::Text(TextCondition::Equals) => "equals",
            Condition::Text(TextCondition::Contains) => "contains",
            Condition::Text(TextCondition::BeginsWith) => "begins_with",
            Condition::Text(TextCondition::EndsWith) => "ends_with",
            Condition::Numeric(NumericCondition::Equals) => "eq",
            Condition::Numeric(NumericCondition::LessThan) => "lt",
            Condition::Numeric(NumericCondition::LessOrEqual) => "lte",
            Condition::Numeric(NumericCondition::GreaterThan) => "gt",
            Condition::Numeric(NumericCondition::GreaterOrEqual) => "gte",
            Condition::Numeric(NumericCondition::Range) => "range",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Condition {
    type Err = CatalogError;

    fn from_str(tag: &str) -> Result<Self> {
        let condition = match tag.to_ascii_lowercase().as_str() {
            "equals" => Condition::Text(TextCondition::Equals),
            "contains" => Condition::Text(TextCondition::Contains),
            "begins_with" => Condition::Text(TextCondition::BeginsWith),
            "ends_with" => Condition::Text(TextCondition::EndsWith),
            "eq" => Condition::Numeric(NumericCondition::Equals),
            "lt" => Condition::Numeric(NumericCondition::LessThan),
            "lte" => Condition::Numeric(NumericCondition::LessOrEqual),
            "gt" => Condition::Numeric(NumericCondition::GreaterThan),
            "gte" => Condition::Numeric(NumericCondition::GreaterOrEqual),
            "range" => Condition::Numeric(NumericCondition::Range),
            other => {
                return Err(CatalogError::InvalidFilter {
                    field: String::new(),
                    reason: format!("unknown condition '{}'", other),
                })
            }
        };
        Ok(condition)
    }
}

// =============================================================================
// Filter
// =============================================================================

/// One field condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Canonical or legacy field name
    pub field: String,
    pub condition: Condition,
    pub value: String,
    /// Second bound, only read by [`NumericCondition::Range`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

impl Filter {
    pub fn new(field: impl Into<String>, condition: Condition, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            condition,
            value: value.into(),
            value2: None,
        }
    }

    /// Range filter over `[min(a, b), max(a, b)]`
    pub fn range(field: impl Into<String>, a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            value2: Some(b.into()),
            ..Self::new(field, Condition::Numeric(NumericCondition::Range), a)
        }
    }

    /// Check the filter names a known non-system field and uses a condition
    /// of that field's kind.
    ///
    /// Evaluation does not require this: an unchecked filter on an unknown
    /// field simply matches nothing.
    pub fn validate(&self) -> Result<Field> {
        let invalid = |reason: String| CatalogError::InvalidFilter {
            field: self.field.clone(),
            reason,
        };

        let field = Field::from_name(&self.field).ok_or_else(|| invalid("unknown field".to_string()))?;
        if field.is_system() {
            return Err(invalid("system fields cannot be filtered".to_string()));
        }
        if field.kind() != self.condition.kind() {
            return Err(invalid(format!(
                "condition '{}' does not apply to {:?} field",
                self.condition,
                field.kind()
            )));
        }
        Ok(field)
    }

    /// Whether `record` satisfies this condition
    pub fn matches(&self, record: &TabletRecord) -> bool {
        let Some(raw) = record.get_by_name(&self.field).filter(|v| !v.trim().is_empty()) else {
            return false;
        };

        match self.condition {
            Condition::Text(op) => matches_text(op, raw, &self.value),
            Condition::Numeric(op) => matches_numeric(op, raw, &self.value, self.value2.as_deref()),
        }
    }
}

/// Parses `FIELD:CONDITION:VALUE`, or `FIELD:range:LOW:HIGH`.
/// Values may themselves contain `:` (e.g. `DisplayContrast:gte:1000:1`).
impl FromStr for Filter {
    type Err = CatalogError;

    fn from_str(spec: &str) -> Result<Self> {
        let mut parts = spec.splitn(3, ':');
        let (Some(field), Some(tag), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CatalogError::InvalidFilter {
                field: spec.to_string(),
                reason: "expected FIELD:CONDITION:VALUE".to_string(),
            });
        };

        let condition: Condition = tag.parse().map_err(|_| CatalogError::InvalidFilter {
            field: field.to_string(),
            reason: format!("unknown condition '{}'", tag),
        })?;

        if condition == Condition::Numeric(NumericCondition::Range) {
            if let Some((low, high)) = rest.split_once(':') {
                return Ok(Filter::range(field, low, high));
            }
        }
        Ok(Filter::new(field, condition, rest))
    }
}

fn matches_text(op: TextCondition, raw: &str, expected: &str) -> bool {
    let value = fold(raw);
    let expected = fold(expected);
    match op {
        TextCondition::Equals => value == expected,
        TextCondition::Contains => value.contains(&expected),
        TextCondition::BeginsWith => value.starts_with(&expected),
        TextCondition::EndsWith => value.ends_with(&expected),
    }
}

fn matches_numeric(op: NumericCondition, raw: &str, expected: &str, upper: Option<&str>) -> bool {
    let (Some(value), Some(bound)) = (parse_lenient_number(raw), parse_lenient_number(expected)) else {
        return false;
    };

    let equal = |a: f64, b: f64| (a - b).abs() <= NUMERIC_TOLERANCE;
    match op {
        NumericCondition::Equals => equal(value, bound),
        NumericCondition::LessThan => value < bound,
        NumericCondition::LessOrEqual => value <= bound,
        NumericCondition::GreaterThan => value > bound,
        NumericCondition::GreaterOrEqual => value >= bound,
        NumericCondition::Range => match upper.and_then(parse_lenient_number) {
            Some(other) => value >= bound.min(other) && value <= bound.max(other),
            None => equal(value, bound),
        },
    }
}

// =============================================================================
// Free-text search
// =============================================================================

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("token pattern is valid"))
}

/// Split a query into case-folded tokens; quoted phrases stay whole
pub fn tokenize(query: &str) -> Vec<String> {
    token_pattern()
        .captures_iter(query)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|m| fold(m.as_str()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Whether every token occurs in at least one searched field
pub fn matches_query(record: &TabletRecord, tokens: &[String]) -> bool {
    let haystacks: Vec<String> = SEARCHED_FIELDS
        .iter()
        .filter_map(|field| record.get(*field))
        .map(fold)
        .collect();

    tokens
        .iter()
        .all(|token| haystacks.iter().any(|haystack| haystack.contains(token.as_str())))
}

/// Records matching the free-text query and every condition, in input order
pub fn filter<'a>(records: &'a [TabletRecord], query: &str, conditions: &[Filter]) -> Vec<&'a TabletRecord> {
    let tokens = tokenize(query);
    records
        .iter()
        .filter(|record| matches_query(record, &tokens))
        .filter(|record| conditions.iter().all(|condition| condition.matches(record)))
        .collect()
}
