//! Geometry utilities for "W x H" dimension strings.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Tolerance when matching a width/height ratio to a named aspect ratio
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.05;

/// Named ratios, in matching priority order
const NAMED_RATIOS: [(&str, f64); 6] = [
    ("16:9", 16.0 / 9.0),
    ("16:10", 16.0 / 10.0),
    ("4:3", 4.0 / 3.0),
    ("3:2", 3.0 / 2.0),
    ("1:1", 1.0),
    ("21:9", 21.0 / 9.0),
];

/// A width/height pair in whatever unit the source string used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// width / height, or `None` for a degenerate height
    pub fn ratio(&self) -> Option<f64> {
        if self.height == 0.0 {
            return None;
        }
        let ratio = self.width / self.height;
        ratio.is_finite().then_some(ratio)
    }

    /// Both sides scaled by `factor` (e.g. a mm -> in conversion)
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

fn dimensions_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*x\s*(\d+(?:\.\d+)?)").expect("dimension pattern is valid")
    })
}

/// Extract the first `<number> x <number>` pair from `raw`.
///
/// ```
/// use tablet_catalog::geometry::parse_dimensions;
/// let dims = parse_dimensions("293 x 165 mm").unwrap();
/// assert_eq!((dims.width, dims.height), (293.0, 165.0));
/// ```
pub fn parse_dimensions(raw: &str) -> Option<Dimensions> {
    let captures = dimensions_pattern().captures(raw)?;
    let width: f64 = captures.get(1)?.as_str().parse().ok()?;
    let height: f64 = captures.get(2)?.as_str().parse().ok()?;

    if width.is_finite() && height.is_finite() {
        Some(Dimensions::new(width, height))
    } else {
        None
    }
}

pub fn calculate_diagonal(dims: &Dimensions) -> f64 {
    dims.width.hypot(dims.height)
}

pub fn calculate_area(dims: &Dimensions) -> f64 {
    dims.width * dims.height
}

/// Classify the ratio into a named label, or `"{ratio:.2}:1"` when nothing
/// is within tolerance. The first named ratio within tolerance wins.
pub fn calculate_aspect_ratio(dims: &Dimensions) -> Option<String> {
    let ratio = dims.ratio()?;

    let named = NAMED_RATIOS
        .iter()
        .find(|(_, target)| (ratio - target).abs() <= ASPECT_RATIO_TOLERANCE)
        .map(|(label, _)| label.to_string());

    Some(named.unwrap_or_else(|| format!("{:.2}:1", ratio)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        let dims = parse_dimensions("293 x 165").unwrap();
        assert_eq!(dims, Dimensions::new(293.0, 165.0));

        let dims = parse_dimensions("Active area: 155.52X87.48 mm").unwrap();
        assert_eq!(dims, Dimensions::new(155.52, 87.48));

        let dims = parse_dimensions("1920x1080").unwrap();
        assert_eq!(dims, Dimensions::new(1920.0, 1080.0));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        assert!(parse_dimensions("").is_none());
        assert!(parse_dimensions("large").is_none());
        assert!(parse_dimensions("293 by 165").is_none());
    }

    #[test]
    fn test_diagonal_and_area() {
        let dims = parse_dimensions("293 x 165").unwrap();
        assert!((calculate_diagonal(&dims) - 336.26).abs() < 0.01);
        assert_eq!(calculate_area(&dims), 48345.0);

        let dims = Dimensions::new(3.0, 4.0);
        assert_eq!(calculate_diagonal(&dims), 5.0);
    }

    #[test]
    fn test_named_aspect_ratios() {
        let cases = [
            ((293.0, 165.0), "16:9"),
            ((216.0, 135.0), "16:10"),
            ((200.0, 150.0), "4:3"),
            ((300.0, 200.0), "3:2"),
            ((100.0, 100.0), "1:1"),
            ((210.0, 90.0), "21:9"),
        ];
        for ((w, h), expected) in cases {
            let label = calculate_aspect_ratio(&Dimensions::new(w, h));
            assert_eq!(label.as_deref(), Some(expected), "{}x{}", w, h);
        }
    }

    #[test]
    fn test_unnamed_aspect_ratio() {
        let label = calculate_aspect_ratio(&Dimensions::new(250.0, 100.0));
        assert_eq!(label.as_deref(), Some("2.50:1"));
    }

    #[test]
    fn test_zero_height_has_no_ratio() {
        assert!(calculate_aspect_ratio(&Dimensions::new(10.0, 0.0)).is_none());
    }
}
