//! Case folding and collation shared by the search, sort and audit passes.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Canonical folding for case-insensitive matching: NFKC + Unicode lowercase.
pub fn fold(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

/// Locale-style string ordering.
///
/// Compares folded forms first so `"intuos"` and `"Intuos"` sit together,
/// then falls back to the raw strings to keep the order total.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
