use crate::config::WriteMode;
use crate::drive::{DriveService, Folder};
use crate::error::Result;
use crate::report::record::{header_row, FileRecord};
use crate::report::walker::{FolderWalk, WalkStats};
use crate::sheets::{Sheet, Spreadsheet};

/// Row of the first data record; row 1 holds the header.
pub const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(WalkStats),
    /// Update mode was requested; the sheet was left untouched.
    Skipped,
}

/// Writes one row per file below a folder into a sheet.
pub struct SheetWriter {
    mode: WriteMode,
    progress_interval: usize,
}

impl SheetWriter {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            progress_interval: 20,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Clear `sheet`, write the header, then one row per file in walk order.
    ///
    /// `on_record` is told about every row right after it is written. A
    /// failure part-way leaves the rows written so far in place.
    pub fn write<D, B, P>(
        &self,
        drive: &D,
        root: &Folder,
        sheet: &mut Sheet<'_, B>,
        mut on_record: P,
    ) -> Result<WriteOutcome>
    where
        D: DriveService,
        B: Spreadsheet,
        P: FnMut(usize, &FileRecord),
    {
        if self.mode == WriteMode::Update {
            log::warn!("updating rather than appending isn't supported yet");
            return Ok(WriteOutcome::Skipped);
        }

        log::info!("Formatting sheet {}...", sheet.name());
        sheet.clear_contents()?;
        sheet.set_values(1, 1, &[header_row()])?;

        let mut written = 0usize;
        let stats = FolderWalk::new(drive).walk(root, |folder, file| {
            let record = FileRecord::from_file(drive, file)?;
            sheet.set_values(FIRST_DATA_ROW + written, 1, &[record.to_row()])?;
            written += 1;

            log::debug!("{} » {} written to row {}", folder.name, record.file_name, written + 1);
            if written % self.progress_interval == 0 {
                log::info!("Processed {} files", written);
            }

            on_record(written, &record);
            Ok(())
        })?;

        log::info!("Recorded {} files", stats.files);
        Ok(WriteOutcome::Written(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveFile, MemoryDrive};
    use crate::error::InventoryError;
    use crate::sheets::{CellValue, JsonWorkbookStore, SpreadsheetService};
    use chrono::Utc;
    use tempfile::TempDir;

    fn file(id: &str, owner: Option<&str>) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: format!("{}.bin", id),
            url: format!("mem://{}", id),
            owner: owner.map(str::to_string),
            mime_type: "application/octet-stream".to_string(),
            created: Utc::now(),
            updated: Utc::now(),
            size: 10,
        }
    }

    fn drive() -> MemoryDrive {
        let mut drive = MemoryDrive::new();
        drive
            .add_folder("r", "Root", None)
            .add_folder("s", "Sub", Some("r"))
            .add_file(file("one", Some("a@x.io")), &["r"])
            .add_file(file("two", Some("a@x.io")), &["s"])
            .add_file(file("three", Some("a@x.io")), &["s"]);
        drive
    }

    #[test]
    fn test_header_then_rows() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonWorkbookStore::new(temp_dir.path());
        let mut book = store.create("out", "Out").unwrap();
        let drive = drive();
        let root = drive.folder_by_id("r").unwrap();

        let mut seen = Vec::new();
        let mut sheet = Sheet::first(&mut book).unwrap();
        let outcome = SheetWriter::new(WriteMode::Overwrite)
            .write(&drive, &root, &mut sheet, |n, record| {
                seen.push((n, record.file_id.clone()))
            })
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::Written(stats) if stats.files == 3));
        let rows = sheet.values().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], header_row());
        assert_eq!(rows[1][0], CellValue::from("Root"));
        assert_eq!(seen.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_update_mode_leaves_sheet_alone() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonWorkbookStore::new(temp_dir.path());
        let mut book = store.create("out", "Out").unwrap();
        book.set_values(0, 1, 1, &[vec![CellValue::from("keep me")]])
            .unwrap();

        let drive = drive();
        let root = drive.folder_by_id("r").unwrap();
        let mut sheet = Sheet::first(&mut book).unwrap();
        let outcome = SheetWriter::new(WriteMode::Update)
            .write(&drive, &root, &mut sheet, |_, _| {})
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Skipped);
        let reopened = store.open_by_id("out").unwrap();
        assert_eq!(
            reopened.values(0).unwrap(),
            vec![vec![CellValue::from("keep me")]]
        );
    }

    #[test]
    fn test_failure_keeps_rows_already_written() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonWorkbookStore::new(temp_dir.path());
        let mut book = store.create("out", "Out").unwrap();

        let mut drive = MemoryDrive::new();
        drive
            .add_folder("r", "Root", None)
            .add_file(file("ok", Some("a@x.io")), &["r"])
            .add_file(file("ownerless", None), &["r"]);
        let root = drive.folder_by_id("r").unwrap();

        let mut sheet = Sheet::first(&mut book).unwrap();
        let result = SheetWriter::new(WriteMode::Overwrite).write(&drive, &root, &mut sheet, |_, _| {});
        assert!(matches!(result, Err(InventoryError::MissingOwner { .. })));

        let reopened = store.open_by_id("out").unwrap();
        let rows = reopened.values(0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][7], CellValue::from("ok"));
    }
}
