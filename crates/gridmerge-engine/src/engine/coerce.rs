//! The numeric-literal rule.
//!
//! Shared by summation coercion and by cell edits, so an edit that types a
//! number always produces a cell that the next merge will sum.

use regex::Regex;
use std::sync::LazyLock;

// Anchored at the start only: the longest numeric prefix wins and whatever
// follows it is ignored.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("numeric prefix pattern is valid")
});

/// Parse the leading number of `text` (`12`, `-0.5`, `.5`, `1e3`, `Infinity`).
///
/// Leading whitespace is skipped and anything after the number is ignored,
/// so `"5 units"` is 5 and `"12abc"` is 12. Text that does not start with a
/// number is not a number. Literals too large for `f64` become infinite.
pub fn parse_number(text: &str) -> Option<f64> {
    let literal = NUMERIC_PREFIX.find(text.trim_start())?.as_str();
    match literal.strip_suffix("Infinity") {
        Some("-") => Some(f64::NEG_INFINITY),
        Some(_) => Some(f64::INFINITY),
        None => literal.parse::<f64>().ok(),
    }
}
