//! Merge engine API.
//!
//! This module provides the pure, I/O-free half of gridmerge:
//!
//! - [`CellValue`], [`Row`], [`Grid`] - Data structures for one sheet
//! - [`parse_number`] - The numeric-literal rule shared by coercion and edits
//! - [`merge`] - Positional merge of several grids into one
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`format_number`], [`row_to_text`] - Format values for display

mod cell;
mod cell_ref;
mod coerce;
mod format;
mod grid;
mod merge;

pub use cell::CellValue;
pub use cell_ref::CellRef;
pub use coerce::parse_number;
pub use format::{format_number, row_to_text};
pub use grid::{Grid, Row};
pub use merge::{MergeError, merge};
