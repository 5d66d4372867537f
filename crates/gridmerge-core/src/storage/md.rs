//! Markdown preview of a grid.
//!
//! Row 0 is treated as the header, matching how the sheets are usually laid
//! out; the merge engine itself gives row 0 no special meaning.

use gridmerge_engine::{CellRef, Grid};
use std::fmt::Write as _;
use std::path::Path;

/// Render a grid as a Markdown document with a single table.
pub fn render_markdown(grid: &Grid, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", escape_markdown(title));
    let _ = writeln!(out);

    let width = grid.width();
    let Some(header) = grid.row(0).filter(|_| width > 0) else {
        let _ = writeln!(out, "*Empty sheet*");
        return out;
    };

    // Header row; unnamed columns get a positional label.
    out.push_str("| # |");
    for col in 0..width {
        let label = header
            .get(col)
            .map(|cell| cell.to_string())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Column {}", CellRef::col_to_letters(col)));
        let _ = write!(out, " {} |", escape_markdown(&label));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in 0..width {
        out.push_str("---|");
    }
    out.push('\n');

    for (idx, row) in grid.rows().iter().enumerate().skip(1) {
        let _ = write!(out, "| {} |", idx);
        for col in 0..width {
            let display = row.get(col).map(|cell| cell.to_string()).unwrap_or_default();
            let _ = write!(out, " {} |", escape_markdown(&display));
        }
        out.push('\n');
    }

    if grid.len() <= 1 {
        let _ = writeln!(out);
        let _ = writeln!(out, "*No data rows*");
    }

    out
}

/// Write the Markdown preview of a grid to a file
pub fn write_markdown(path: &Path, grid: &Grid, title: &str) -> std::io::Result<()> {
    std::fs::write(path, render_markdown(grid, title))
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
