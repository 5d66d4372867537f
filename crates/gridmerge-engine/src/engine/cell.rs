//! Cell values as they come out of a decoded sheet.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::coerce::parse_number;
use super::format::format_number;

/// The value held at one position of a row.
///
/// `Absent` marks a position the row does not really have (a hole or a
/// short row). It is not the same thing as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    #[default]
    Absent,
}

impl CellValue {
    pub fn number(n: f64) -> Self {
        CellValue::Number(n)
    }

    pub fn text(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }

    /// Interpret raw user input the way an edit does: input that starts with
    /// a number becomes that number, anything else is stored verbatim as text.
    pub fn from_input(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(raw.to_string()),
        }
    }

    /// Coerce for summation. Booleans and absent cells never count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => parse_number(s),
            CellValue::Bool(_) | CellValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Absent => Ok(()),
        }
    }
}
