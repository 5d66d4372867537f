use super::{Session, SourceId};
use crate::error::{GridMergeError, Result};
use crate::storage::{read_sheet, write_xlsx};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Upper bound on concurrent decodes: one per available core.
pub(crate) fn max_decode_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Session {
    /// Load workbooks from disk.
    ///
    /// Every path is registered (as processing) up front, in order, then
    /// decoded on a pool of worker threads, at most one per available core.
    /// Results are applied here, one file at a time, so no half-updated file
    /// is ever visible. A file that fails to decode is marked as an error and does
    /// not affect the others.
    pub fn load_paths(&mut self, paths: &[PathBuf]) -> Vec<SourceId> {
        let pending: Vec<(SourceId, &Path)> = paths
            .iter()
            .map(|path| {
                let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                (self.begin_load(display_name(path), size), path.as_path())
            })
            .collect();

        let workers = max_decode_workers().min(pending.len());
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let (next, pending) = (&next, &pending);
                scope.spawn(move || {
                    while let Some(&(id, path)) =
                        pending.get(next.fetch_add(1, Ordering::Relaxed))
                    {
                        if tx.send((id, read_sheet(path))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(tx);

        for (id, result) in rx {
            self.complete_load(id, result);
        }

        pending.into_iter().map(|(id, _)| id).collect()
    }

    /// Write the merged grid to an xlsx file.
    pub fn export_to(&self, path: &Path, sheet_label: &str) -> Result<()> {
        let merged = self.merged().ok_or(GridMergeError::NothingMerged)?;
        write_xlsx(path, merged, sheet_label)?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}
