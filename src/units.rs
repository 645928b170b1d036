//! Unit conversion utilities and lenient number parsing.
//!
//! Values are stored as the raw strings the catalog was given. Conversions
//! here are only ever rendered next to those strings, never written back.

use regex::Regex;
use std::sync::OnceLock;

use crate::geometry::parse_dimensions;
use crate::schema::Field;

pub const MM_PER_INCH: f64 = 25.4;
pub const LB_PER_KG: f64 = 2.20462;

pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn in_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn lpmm_to_lpi(lpmm: f64) -> f64 {
    lpmm * MM_PER_INCH
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+(?:,\d+)*(?:\.\d+)?").expect("number pattern is valid"))
}

/// First number embedded in `raw`, with comma thousands separators removed.
///
/// `"1920 x 1080"` yields 1920, `"2,560"` yields 2560, `"n/a"` yields `None`.
pub fn parse_lenient_number(raw: &str) -> Option<f64> {
    let found = number_pattern().find(raw)?;
    let cleaned = found.as_str().replace(',', "");
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Transient imperial rendering for a stored metric value, if the field has
/// one. Dimension strings convert both sides.
pub fn imperial_hint(field: Field, raw: &str) -> Option<String> {
    match field.descriptor().unit? {
        "mm" => {
            if let Some(dims) = parse_dimensions(raw) {
                let inches = dims.scaled(1.0 / MM_PER_INCH);
                Some(format!("{:.2} x {:.2} in", inches.width, inches.height))
            } else {
                parse_lenient_number(raw).map(|mm| format!("{:.2} in", mm_to_in(mm)))
            }
        }
        "g" => parse_lenient_number(raw).map(|grams| format!("{:.2} lb", kg_to_lb(grams / 1000.0))),
        "lpmm" => parse_lenient_number(raw).map(|lpmm| format!("{:.0} LPI", lpmm_to_lpi(lpmm))),
        _ => None,
    }
}
