//! Error types for Gridmerge core.

use thiserror::Error;

use crate::session::SourceId;
use gridmerge_engine::MergeError;

/// Errors that can occur while driving a merge session
#[derive(Error, Debug)]
pub enum GridMergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to write workbook: {0}")]
    Encode(String),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("No file with id {0}")]
    UnknownSource(SourceId),

    #[error("File {0} has not been parsed successfully")]
    SourceNotReady(SourceId),

    #[error("Nothing has been merged yet")]
    NothingMerged,

    #[error("Config error: {0}")]
    Config(String),
}

/// Why a single file could not be turned into a grid.
///
/// Kept cloneable and string-backed so it can be recorded on the failed file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("Failed to open workbook: {0}")]
    Workbook(String),

    #[error("Workbook contains no sheets")]
    NoSheets,
}

pub type Result<T> = std::result::Result<T, GridMergeError>;
