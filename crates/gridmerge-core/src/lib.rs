//! gridmerge-core - UI-agnostic merge session, storage and summarization.

pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod summary;

pub use config::{Config, ExportConfig, SummaryConfig};
pub use error::{DecodeError, GridMergeError, Result};
pub use session::{Session, SourceFile, SourceId, SourceLoad, SourceStatus};
pub use summary::{GeminiSummarizer, Sample, Summarizer};

pub use gridmerge_engine::{CellRef, CellValue, Grid, MergeError, Row};
