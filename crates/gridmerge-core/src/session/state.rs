use crate::error::DecodeError;
use gridmerge_engine::Grid;
use std::fmt;
use uuid::Uuid;

/// Opaque identity of a loaded file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(Uuid);

impl SourceId {
    pub(crate) fn new() -> Self {
        SourceId(Uuid::new_v4())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

/// Where a file is in its load lifecycle.
///
/// `Processing` moves to `Done` or `Failed` exactly once.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceLoad {
    Processing,
    Done(Grid),
    Failed(String),
}

/// Flat status of a [`SourceLoad`], for listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    Processing,
    Done,
    Error,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceStatus::Processing => "processing",
            SourceStatus::Done => "done",
            SourceStatus::Error => "error",
        })
    }
}

/// A file the user selected.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: SourceId,
    /// Display name (usually the file name).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub load: SourceLoad,
}

impl SourceFile {
    pub fn status(&self) -> SourceStatus {
        match self.load {
            SourceLoad::Processing => SourceStatus::Processing,
            SourceLoad::Done(_) => SourceStatus::Done,
            SourceLoad::Failed(_) => SourceStatus::Error,
        }
    }

    /// The parsed grid, once loading succeeded.
    pub fn grid(&self) -> Option<&Grid> {
        match &self.load {
            SourceLoad::Done(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.load {
            SourceLoad::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub(crate) fn finish(&mut self, result: Result<Grid, DecodeError>) {
        self.load = match result {
            Ok(grid) => SourceLoad::Done(grid),
            Err(err) => SourceLoad::Failed(err.to_string()),
        };
    }
}

/// UI-agnostic state of one merge session.
///
/// Holds the selected files in display order and the derived merged grid.
/// The merged grid is never edited directly: edits go to a source file and
/// the merged grid is recomputed from the sources.
#[derive(Default)]
pub struct Session {
    pub(crate) files: Vec<SourceFile>,
    /// Last merge result, if a merge has succeeded and nothing invalidated it
    pub(crate) merged: Option<Grid>,
    /// Cached summary of `merged`
    pub(crate) summary: Option<String>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files in display order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Id of the file at a 0-based display position.
    pub fn id_at(&self, index: usize) -> Option<SourceId> {
        self.files.get(index).map(|f| f.id)
    }

    pub fn merged(&self) -> Option<&Grid> {
        self.merged.as_ref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Number of files that loaded successfully.
    pub fn ready_count(&self) -> usize {
        self.files.iter().filter(|f| f.grid().is_some()).count()
    }

    /// Grids of all loaded files, in display order.
    pub(crate) fn ready_grids(&self) -> Vec<&Grid> {
        self.files.iter().filter_map(SourceFile::grid).collect()
    }

    pub(crate) fn position(&self, id: SourceId) -> Option<usize> {
        self.files.iter().position(|f| f.id == id)
    }

    /// Drop the merged grid and anything derived from it.
    pub(crate) fn invalidate_merge(&mut self) {
        self.merged = None;
        self.summary = None;
    }
}
