//! gridmerge_engine - Grid model, cell coercion and positional merge.

pub mod engine;

pub use engine::{
    CellRef, CellValue, Grid, MergeError, Row, format_number, merge, parse_number, row_to_text,
};
