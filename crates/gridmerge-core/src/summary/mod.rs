//! Free-text summaries of a merged grid.
//!
//! A [`Summarizer`] never fails: problems degrade to one of the fixed
//! messages below so the caller can always show *something*.

mod gemini;

pub use gemini::GeminiSummarizer;

use gridmerge_engine::{CellValue, Grid, row_to_text};

/// Returned when no API key is configured.
pub const UNAVAILABLE_MESSAGE: &str =
    "Summary unavailable: no API key configured. Set GEMINI_API_KEY or summary.api_key.";
/// Returned on transport or service errors.
pub const FAILED_MESSAGE: &str =
    "Failed to analyze the data. Check your API key or network connection.";
/// Returned when the service answers with no text.
pub const EMPTY_REPLY_MESSAGE: &str = "Unable to generate an analysis.";

pub const DEFAULT_SAMPLE_ROWS: usize = 50;

pub trait Summarizer {
    fn summarize(&self, grid: &Grid) -> String;
}

/// The slice of a grid that is sent for summarization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub headers: Vec<CellValue>,
    /// Data rows rendered as `", "`-joined text.
    pub rows: Vec<String>,
}

impl Sample {
    /// Take the header row plus at most `max_rows` data rows.
    pub fn from_grid(grid: &Grid, max_rows: usize) -> Self {
        let headers = grid.row(0).map(|row| row.to_vec()).unwrap_or_default();
        let rows = grid
            .rows()
            .iter()
            .skip(1)
            .take(max_rows)
            .map(|row| row_to_text(row))
            .collect();
        Sample { headers, rows }
    }
}

pub const SYSTEM_INSTRUCTION: &str = "You are an expert data analyst helping a user \
understand financial or operational reports that were just merged together.";

/// Build the user prompt for a sample.
pub fn build_prompt(sample: &Sample) -> String {
    format!(
        "I merged several spreadsheet files by summing the values of matching cells.\n\
         Header row: {headers}\n\
         First {count} rows of the merged result:\n\
         {rows}\n\
         \n\
         Please give a concise executive summary of this data:\n\
         1. Identify the columns that contain metrics (numbers).\n\
         2. Point out any notably high values or interesting patterns in the sample.\n\
         3. Based on the headers, infer what this data most likely represents.\n\
         \n\
         Keep it professional and brief.",
        headers = row_to_text(&sample.headers),
        count = sample.rows.len(),
        rows = sample.rows.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_grid(data_rows: usize) -> Grid {
        let mut grid = Grid::from_rows(vec![vec!["Region".into(), "Qty".into()]]);
        for i in 0..data_rows {
            grid.push_row(vec![format!("R{}", i).into(), (i as f64).into()]);
        }
        grid
    }

    #[test]
    fn test_sample_caps_rows() {
        let sample = Sample::from_grid(&numbered_grid(60), DEFAULT_SAMPLE_ROWS);
        assert_eq!(sample.headers, vec![CellValue::text("Region"), CellValue::text("Qty")]);
        assert_eq!(sample.rows.len(), 50);
        assert_eq!(sample.rows[0], "R0, 0");
        assert_eq!(sample.rows[49], "R49, 49");
    }

    #[test]
    fn test_sample_of_empty_grid() {
        let sample = Sample::from_grid(&Grid::new(), 50);
        assert!(sample.headers.is_empty());
        assert!(sample.rows.is_empty());
    }

    #[test]
    fn test_prompt_mentions_headers_and_rows() {
        let prompt = build_prompt(&Sample::from_grid(&numbered_grid(2), 50));
        assert!(prompt.contains("Header row: Region, Qty"));
        assert!(prompt.contains("R0, 0\nR1, 1"));
        assert!(prompt.contains("summing"));
    }
}
