use super::cell::CellValue;

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        "#NUM!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Join a row's displayed cells with `", "`.
pub fn row_to_text(row: &[CellValue]) -> String {
    row.iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
