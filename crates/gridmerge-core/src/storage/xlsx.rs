//! Workbook import/export.
//!
//! Only the first sheet of a workbook is read. Any format calamine can sniff
//! (xlsx, xls, xlsb, ods) is accepted; exports are always xlsx.

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use gridmerge_engine::{CellValue, Grid, Row, format_number};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;
use std::path::Path;

use crate::error::{DecodeError, GridMergeError, Result};

/// Decode the first sheet of a workbook into a grid.
pub fn decode(bytes: &[u8]) -> std::result::Result<Grid, DecodeError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DecodeError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheets)?
        .map_err(|e| DecodeError::Workbook(e.to_string()))?;

    // The range starts at the first used cell, which need not be A1.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid = Grid::new();
    for _ in 0..start_row {
        grid.push_row(Row::new());
    }
    for row in range.rows() {
        let mut cells: Row = vec![CellValue::Absent; start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        // Trailing empties mean "not present", so the row just ends early.
        while cells.last().is_some_and(CellValue::is_absent) {
            cells.pop();
        }
        grid.push_row(cells);
    }
    Ok(grid)
}

/// Read a workbook from disk and decode its first sheet.
pub fn read_sheet(path: &Path) -> std::result::Result<Grid, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::Io(e.to_string()))?;
    decode(&bytes)
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Absent,
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Encode a grid as a single-sheet xlsx workbook.
pub fn encode(grid: &Grid, sheet_label: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_label)
        .map_err(|e| {
            GridMergeError::Encode(format!("Invalid sheet name '{}': {}", sheet_label, e))
        })?;

    for (r, row) in grid.rows().iter().enumerate() {
        let row_idx = u32::try_from(r)
            .map_err(|_| GridMergeError::Encode(format!("Row {} is out of range", r + 1)))?;
        for (c, cell) in row.iter().enumerate() {
            let col_idx = u16::try_from(c)
                .map_err(|_| GridMergeError::Encode(format!("Column {} is out of range", c + 1)))?;
            let written = match cell {
                CellValue::Absent => continue,
                CellValue::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_idx, col_idx, *n)
                }
                CellValue::Number(n) => {
                    worksheet.write_string(row_idx, col_idx, format_number(*n))
                }
                CellValue::Text(s) => worksheet.write_string(row_idx, col_idx, s),
                CellValue::Bool(b) => worksheet.write_boolean(row_idx, col_idx, *b),
            };
            written.map_err(|e| GridMergeError::Encode(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| GridMergeError::Encode(e.to_string()))
}

/// Encode a grid and write it to `path`.
pub fn write_xlsx(path: &Path, grid: &Grid, sheet_label: &str) -> Result<()> {
    let bytes = encode(grid, sheet_label)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
