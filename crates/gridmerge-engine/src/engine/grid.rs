//! The sheet value type.
//!
//! A [`Grid`] is an ordered list of rows; rows may have different lengths.
//! Rows are reference counted so that an edit replaces only the row it
//! touches. Every other row of the edited grid is shared with the previous
//! snapshot, and holders of that snapshot never observe the change.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cell::CellValue;

/// One row of cells.
pub type Row = Vec<CellValue>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Arc<Row>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Grid {
            rows: rows.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn rows(&self) -> &[Arc<Row>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// The cell at `[row][col]`, or `None` when the position does not exist.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(Arc::new(row));
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Return a copy of this grid with `[row][col]` set to `value`.
    ///
    /// Only the edited row is rebuilt; all other rows are shared. Writing past
    /// the end of the row pads it with absent cells. Returns `None` when the
    /// grid has no such row.
    pub fn with_cell(&self, row: usize, col: usize, value: CellValue) -> Option<Grid> {
        let current = self.rows.get(row)?;
        let mut edited: Row = current.as_ref().clone();
        if edited.len() <= col {
            edited.resize(col + 1, CellValue::Absent);
        }
        edited[col] = value;

        let mut rows = self.rows.clone();
        rows[row] = Arc::new(edited);
        Some(Grid { rows })
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Arc<Row>> {
        &mut self.rows
    }
}

impl From<Vec<Row>> for Grid {
    fn from(rows: Vec<Row>) -> Self {
        Grid::from_rows(rows)
    }
}
