//! Storage module for workbook import/export and Markdown previews

pub mod md;
pub mod xlsx;

pub use md::{render_markdown, write_markdown};
pub use xlsx::{decode, encode, read_sheet, write_xlsx};
