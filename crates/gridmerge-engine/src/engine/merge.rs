//! Positional merge.
//!
//! Grids are combined by row/column index. The first grid is the template:
//! it supplies the shape and wins every cell that is not numeric on both
//! sides. Cells that are numeric on both sides are summed.

use std::borrow::Borrow;
use std::sync::Arc;
use thiserror::Error;

use super::cell::CellValue;
use super::grid::Grid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("At least 2 successfully parsed files are required to merge (got {provided})")]
    InsufficientInputs { provided: usize },
}

/// Merge `grids` in order into a fresh grid.
///
/// - Rows a later grid has beyond the output are appended as-is.
/// - Within an existing row, a column past the output row's end is not
///   merged; the output row is never back-filled.
///
/// Inputs are never mutated. Output rows that end up unchanged share
/// storage with the input they came from.
pub fn merge<G: Borrow<Grid>>(grids: &[G]) -> Result<Grid, MergeError> {
    if grids.len() < 2 {
        return Err(MergeError::InsufficientInputs {
            provided: grids.len(),
        });
    }

    let mut merged = grids[0].borrow().clone();

    for grid in &grids[1..] {
        for (r, row) in grid.borrow().rows().iter().enumerate() {
            let rows = merged.rows_mut();
            let Some(target) = rows.get_mut(r) else {
                rows.push(Arc::clone(row));
                continue;
            };

            for (c, cell) in row.iter().enumerate() {
                let Some(existing) = target.get(c) else {
                    break;
                };
                if let (Some(a), Some(b)) = (existing.as_number(), cell.as_number()) {
                    Arc::make_mut(target)[c] = CellValue::Number(a + b);
                }
            }
        }
    }

    Ok(merged)
}
