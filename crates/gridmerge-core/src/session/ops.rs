use super::{Session, SourceFile, SourceId, SourceLoad};
use crate::error::{DecodeError, GridMergeError, Result};
use crate::storage::encode;
use crate::summary::Summarizer;
use gridmerge_engine::{CellRef, CellValue, Grid, MergeError, merge as merge_grids};

impl Session {
    /// Register a file whose decode is about to start.
    ///
    /// Adding a file resets any previous merge.
    pub fn begin_load(&mut self, name: impl Into<String>, size: u64) -> SourceId {
        let id = SourceId::new();
        self.files.push(SourceFile {
            id,
            name: name.into(),
            size,
            load: SourceLoad::Processing,
        });
        self.invalidate_merge();
        id
    }

    /// Apply the outcome of a decode.
    ///
    /// Returns `false` when the result was discarded: the file was removed
    /// while decoding, or its status was already settled.
    pub fn complete_load(
        &mut self,
        id: SourceId,
        result: std::result::Result<Grid, DecodeError>,
    ) -> bool {
        let Some(file) = self.files.iter_mut().find(|f| f.id == id) else {
            log::debug!("Discarding decode result for removed file {}", id);
            return false;
        };
        if file.load != SourceLoad::Processing {
            log::debug!("Ignoring second decode result for file {}", id);
            return false;
        }
        if let Err(err) = &result {
            log::warn!("Failed to read {}: {}", file.name, err);
        }
        file.finish(result);
        true
    }

    /// Remove a file. Invalidates the merged grid and its summary.
    pub fn remove(&mut self, id: SourceId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        self.files.remove(idx);
        self.invalidate_merge();
        true
    }

    /// Merge all loaded files in display order.
    ///
    /// Fails with [`MergeError::InsufficientInputs`] when fewer than two files
    /// are loaded; the previous merge (if any) is left in place.
    pub fn merge(&mut self) -> Result<&Grid> {
        let merged = merge_grids(&self.ready_grids())?;
        log::info!(
            "Merged {} files into {} rows",
            self.ready_count(),
            merged.len()
        );
        self.summary = None;
        Ok(&*self.merged.insert(merged))
    }

    /// Edit one cell of a loaded file and return the file's updated grid.
    ///
    /// `raw` follows the numeric-literal rule: numbers are stored as numbers,
    /// anything else as text. If a merge result is showing, it is recomputed
    /// from the current sources.
    pub fn apply_edit(&mut self, id: SourceId, cell: CellRef, raw: &str) -> Result<&Grid> {
        let idx = self.position(id).ok_or(GridMergeError::UnknownSource(id))?;
        let SourceLoad::Done(grid) = &mut self.files[idx].load else {
            return Err(GridMergeError::SourceNotReady(id));
        };

        match grid.with_cell(cell.row, cell.col, CellValue::from_input(raw)) {
            Some(edited) => *grid = edited,
            None => log::debug!("Edit at {} is outside file {}; ignored", cell, id),
        }

        if self.merged.is_some() {
            self.recompute();
        }

        match &self.files[idx].load {
            SourceLoad::Done(grid) => Ok(grid),
            _ => Err(GridMergeError::SourceNotReady(id)),
        }
    }

    /// Re-derive the merged grid from the current sources.
    ///
    /// Left as-is when fewer than two files are loaded.
    fn recompute(&mut self) {
        let result = merge_grids(&self.ready_grids());
        match result {
            Ok(merged) => {
                self.merged = Some(merged);
                self.summary = None;
            }
            Err(MergeError::InsufficientInputs { provided }) => {
                log::debug!("Skipping recompute: only {} file(s) loaded", provided);
            }
        }
    }

    /// Summarize the merged grid. Returns `None` when nothing is merged.
    pub fn summarize(&mut self, summarizer: &dyn Summarizer) -> Option<&str> {
        let merged = self.merged.as_ref()?;
        let text = summarizer.summarize(merged);
        Some(self.summary.insert(text).as_str())
    }

    /// Encode the merged grid as an xlsx workbook.
    pub fn export(&self, sheet_label: &str) -> Result<Vec<u8>> {
        let merged = self.merged.as_ref().ok_or(GridMergeError::NothingMerged)?;
        let bytes = encode(merged, sheet_label)?;
        log::info!("Exported merged grid ({} bytes)", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SourceStatus;
    use crate::storage::decode;
    use gridmerge_engine::Row;
    use std::cell::Cell;
    use std::sync::Arc;

    fn grid(rows: Vec<Row>) -> Grid {
        Grid::from_rows(rows)
    }

    fn region_sheet(qty: f64) -> Grid {
        grid(vec![
            vec!["Region".into(), "Qty".into()],
            vec!["East".into(), qty.into()],
        ])
    }

    fn loaded(session: &mut Session, name: &str, g: Grid) -> SourceId {
        let id = session.begin_load(name, 0);
        assert!(session.complete_load(id, Ok(g)));
        id
    }

    struct CountingSummarizer(Cell<usize>);

    impl Summarizer for CountingSummarizer {
        fn summarize(&self, grid: &Grid) -> String {
            self.0.set(self.0.get() + 1);
            format!("{} rows", grid.len())
        }
    }

    #[test]
    fn test_lifecycle_processing_to_done() {
        let mut session = Session::new();
        let id = session.begin_load("a.xlsx", 42);
        let file = session.file(id).unwrap();
        assert_eq!(file.status(), SourceStatus::Processing);
        assert_eq!(file.size, 42);
        assert!(file.grid().is_none());

        assert!(session.complete_load(id, Ok(region_sheet(1.0))));
        let file = session.file(id).unwrap();
        assert_eq!(file.status(), SourceStatus::Done);
        assert_eq!(file.grid(), Some(&region_sheet(1.0)));
    }

    #[test]
    fn test_lifecycle_processing_to_error() {
        let mut session = Session::new();
        let id = session.begin_load("broken.xlsx", 3);
        assert!(session.complete_load(id, Err(DecodeError::NoSheets)));
        let file = session.file(id).unwrap();
        assert_eq!(file.status(), SourceStatus::Error);
        assert_eq!(file.error(), Some("Workbook contains no sheets"));
    }

    #[test]
    fn test_terminal_status_is_applied_once() {
        let mut session = Session::new();
        let id = loaded(&mut session, "a.xlsx", region_sheet(1.0));
        assert!(!session.complete_load(id, Err(DecodeError::NoSheets)));
        assert_eq!(session.file(id).unwrap().status(), SourceStatus::Done);
    }

    #[test]
    fn test_late_result_for_removed_file_is_discarded() {
        let mut session = Session::new();
        let id = session.begin_load("a.xlsx", 0);
        assert!(session.remove(id));
        assert!(!session.complete_load(id, Ok(region_sheet(1.0))));
        assert!(session.files().is_empty());
    }

    #[test]
    fn test_merge_requires_two_ready_files() {
        let mut session = Session::new();
        let err = session.merge().unwrap_err();
        assert!(matches!(
            err,
            GridMergeError::Merge(MergeError::InsufficientInputs { provided: 0 })
        ));

        loaded(&mut session, "a.xlsx", region_sheet(1.0));
        let failed = session.begin_load("b.xlsx", 0);
        session.complete_load(failed, Err(DecodeError::Workbook("bad".into())));
        session.begin_load("c.xlsx", 0);

        let err = session.merge().unwrap_err();
        assert!(matches!(
            err,
            GridMergeError::Merge(MergeError::InsufficientInputs { provided: 1 })
        ));
        assert!(session.merged().is_none());
    }

    #[test]
    fn test_merge_skips_failed_and_pending_files() {
        let mut session = Session::new();
        loaded(&mut session, "a.xlsx", region_sheet(10.0));
        let failed = session.begin_load("bad.xlsx", 0);
        session.complete_load(failed, Err(DecodeError::NoSheets));
        session.begin_load("pending.xlsx", 0);
        loaded(&mut session, "b.xlsx", region_sheet(5.0));

        let merged = session.merge().unwrap();
        assert_eq!(merged.get(1, 1), Some(&CellValue::Number(15.0)));
    }

    #[test]
    fn test_adding_a_file_resets_merge() {
        let mut session = Session::new();
        loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();

        session.begin_load("c.xlsx", 0);
        assert!(session.merged().is_none());
    }

    #[test]
    fn test_edit_recomputes_visible_merge() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();

        let edited = session.apply_edit(a, CellRef::new(1, 1), "20").unwrap();
        assert_eq!(edited.get(1, 1), Some(&CellValue::Number(20.0)));
        assert_eq!(
            session.merged().unwrap().get(1, 1),
            Some(&CellValue::Number(25.0))
        );
    }

    #[test]
    fn test_edit_to_text_abandons_sum() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();

        session.apply_edit(a, CellRef::new(1, 1), "n/a").unwrap();
        assert_eq!(
            session.merged().unwrap().get(1, 1),
            Some(&CellValue::text("n/a"))
        );
    }

    #[test]
    fn test_edit_reclassifies_label_as_number() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", grid(vec![vec!["North".into()]]));
        loaded(&mut session, "b.xlsx", grid(vec![vec![5.0.into()]]));

        assert_eq!(
            session.merge().unwrap().get(0, 0),
            Some(&CellValue::text("North"))
        );
        session.apply_edit(a, CellRef::new(0, 0), "10").unwrap();
        assert_eq!(
            session.merged().unwrap().get(0, 0),
            Some(&CellValue::Number(15.0))
        );
    }

    #[test]
    fn test_edit_without_merge_does_not_merge() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));

        session.apply_edit(a, CellRef::new(1, 1), "1").unwrap();
        assert!(session.merged().is_none());
    }

    #[test]
    fn test_edit_keeps_merge_when_too_few_sources() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        let b = loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();
        let before = session.merged().unwrap().clone();

        // Force the second file back out of the ready set without a removal.
        session.files[1].load = SourceLoad::Failed("gone".into());
        session.apply_edit(a, CellRef::new(1, 1), "99").unwrap();
        assert_eq!(session.merged(), Some(&before));
        assert!(session.apply_edit(b, CellRef::new(0, 0), "x").is_err());
    }

    #[test]
    fn test_edit_shares_untouched_rows() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        let snapshot = session.file(a).unwrap().grid().unwrap().clone();

        let edited = session.apply_edit(a, CellRef::new(1, 1), "11").unwrap();
        assert!(Arc::ptr_eq(&snapshot.rows()[0], &edited.rows()[0]));
        assert!(!Arc::ptr_eq(&snapshot.rows()[1], &edited.rows()[1]));
        assert_eq!(snapshot.get(1, 1), Some(&CellValue::Number(10.0)));
    }

    #[test]
    fn test_edit_outside_grid_is_ignored() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        let edited = session.apply_edit(a, CellRef::new(7, 0), "1").unwrap();
        assert_eq!(edited, &region_sheet(10.0));
    }

    #[test]
    fn test_edit_errors() {
        let mut session = Session::new();
        let pending = session.begin_load("a.xlsx", 0);
        assert!(matches!(
            session.apply_edit(pending, CellRef::new(0, 0), "1"),
            Err(GridMergeError::SourceNotReady(id)) if id == pending
        ));

        session.remove(pending);
        assert!(matches!(
            session.apply_edit(pending, CellRef::new(0, 0), "1"),
            Err(GridMergeError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_edit_never_changes_status() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        session.apply_edit(a, CellRef::new(0, 0), "").unwrap();
        assert_eq!(session.file(a).unwrap().status(), SourceStatus::Done);
    }

    #[test]
    fn test_remove_invalidates_merge_and_summary() {
        let mut session = Session::new();
        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();
        let summarizer = CountingSummarizer(Cell::new(0));
        assert_eq!(session.summarize(&summarizer), Some("2 rows"));

        assert!(session.remove(a));
        assert!(session.merged().is_none());
        assert!(session.summary().is_none());
        assert!(!session.remove(a));
    }

    #[test]
    fn test_summarize_requires_merge_and_is_cleared_by_recompute() {
        let mut session = Session::new();
        let summarizer = CountingSummarizer(Cell::new(0));
        assert!(session.summarize(&summarizer).is_none());
        assert_eq!(summarizer.0.get(), 0);

        let a = loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();
        session.summarize(&summarizer);
        assert_eq!(session.summary(), Some("2 rows"));

        session.apply_edit(a, CellRef::new(1, 1), "1").unwrap();
        assert!(session.summary().is_none());
        assert_eq!(summarizer.0.get(), 1);
    }

    #[test]
    fn test_export_round_trips_merged_grid() {
        let mut session = Session::new();
        assert!(matches!(
            session.export("Merged Result"),
            Err(GridMergeError::NothingMerged)
        ));

        loaded(&mut session, "a.xlsx", region_sheet(10.0));
        loaded(&mut session, "b.xlsx", region_sheet(5.0));
        session.merge().unwrap();

        let bytes = session.export("Merged Result").unwrap();
        assert_eq!(decode(&bytes).unwrap(), region_sheet(15.0));
    }

    #[test]
    fn test_id_at_follows_display_order() {
        let mut session = Session::new();
        let a = session.begin_load("a.xlsx", 0);
        let b = session.begin_load("b.xlsx", 0);
        assert_eq!(session.id_at(0), Some(a));
        assert_eq!(session.id_at(1), Some(b));
        assert_eq!(session.id_at(2), None);
        assert_eq!(a.to_string().len(), 8);
    }
}
