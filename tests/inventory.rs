use chrono::{TimeZone, Utc};
use drive_inventory::report::{header_row, Column};
use drive_inventory::{
    CellValue, Config, DriveInventory, InventoryError, JsonWorkbookStore, OutputMode, RunOutcome,
    Sheet, SpreadsheetService, WriteMode,
};
use filetime::FileTime;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    drive: TempDir,
    books: TempDir,
}

impl Fixture {
    /// ```text
    /// <drive>/
    ///   readme.md
    ///   docs/
    ///     guide.pdf
    ///     img/
    ///       logo.png
    ///   empty/
    /// ```
    fn new() -> Self {
        let drive = TempDir::new().unwrap();
        let root = drive.path();
        fs::create_dir_all(root.join("docs/img")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("readme.md"), "# hello").unwrap();
        fs::write(root.join("docs/guide.pdf"), vec![0u8; 2048]).unwrap();
        fs::write(root.join("docs/img/logo.png"), vec![0u8; 16]).unwrap();

        let books = TempDir::new().unwrap();
        JsonWorkbookStore::new(books.path())
            .create("inventory", "Inventory")
            .unwrap();

        Self { drive, books }
    }

    fn config(&self, root_dir_id: &str) -> Config {
        let mut config = Config::default();
        config.properties.root_dir_id = Some(root_dir_id.to_string());
        config.properties.spreadsheet_id = Some("inventory".to_string());
        config.storage.drive_root = self.drive.path().to_path_buf();
        config.storage.drive_name = Some("My Drive".to_string());
        config.storage.owner_email = Some("owner@example.com".to_string());
        config.report.workbook_dir = self.books.path().to_path_buf();
        config
    }

    fn run(&self, config: Config) -> drive_inventory::Result<RunOutcome> {
        DriveInventory::new(config, OutputMode::Plain, 0, true).run()
    }

    fn rows(&self) -> Vec<Vec<CellValue>> {
        let mut book = JsonWorkbookStore::new(self.books.path())
            .open_by_id("inventory")
            .unwrap();
        Sheet::first(&mut book).unwrap().values().unwrap()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.drive.path().join(relative)
    }
}

fn text(row: &[CellValue], column: Column) -> String {
    row[column.position()].to_string()
}

fn ids(rows: &[Vec<CellValue>]) -> HashSet<String> {
    rows.iter().skip(1).map(|r| text(r, Column::FileId)).collect()
}

#[test]
fn writes_header_and_one_row_per_file() {
    let fixture = Fixture::new();

    let outcome = fixture.run(fixture.config("root")).unwrap();
    let summary = outcome.summary().unwrap();
    assert_eq!(summary.files_recorded, 3);
    assert_eq!(summary.folders_visited, 4);
    assert_eq!(summary.bytes_recorded, 7 + 2048 + 16);

    let rows = fixture.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], header_row());
    assert_eq!(
        ids(&rows),
        ["readme.md", "docs/guide.pdf", "docs/img/logo.png"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    );
}

#[test]
fn records_location_and_metadata() {
    let fixture = Fixture::new();
    let updated = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
    filetime::set_file_mtime(
        fixture.path("docs/img/logo.png"),
        FileTime::from_unix_time(updated.timestamp(), 0),
    )
    .unwrap();

    fixture.run(fixture.config("root")).unwrap();
    let rows = fixture.rows();
    let logo = rows
        .iter()
        .find(|r| text(r, Column::FileId) == "docs/img/logo.png")
        .unwrap();

    assert_eq!(text(logo, Column::Location), "My Drive » docs » img");
    assert_eq!(text(logo, Column::FileName), "logo.png");
    assert_eq!(text(logo, Column::Owner), "owner@example.com");
    assert_eq!(text(logo, Column::Type), "image/png");
    assert_eq!(logo[Column::Size.position()], CellValue::Integer(16));
    assert_eq!(logo[Column::Updated.position()], CellValue::DateTime(updated));
    assert!(text(logo, Column::Url).starts_with("file://"));

    let readme = rows
        .iter()
        .find(|r| text(r, Column::FileId) == "readme.md")
        .unwrap();
    assert_eq!(text(readme, Column::Location), "My Drive");
}

#[test]
fn subfolder_run_keeps_full_location() {
    let fixture = Fixture::new();

    let outcome = fixture.run(fixture.config("docs")).unwrap();
    assert_eq!(outcome.summary().unwrap().root_folder.name, "docs");

    let rows = fixture.rows();
    assert_eq!(rows.len(), 3);
    let locations: HashSet<String> = rows
        .iter()
        .skip(1)
        .map(|r| text(r, Column::Location))
        .collect();
    assert!(locations.contains("My Drive » docs"));
    assert!(locations.contains("My Drive » docs » img"));
}

#[test]
fn rerun_leaves_no_stale_rows() {
    let fixture = Fixture::new();
    fixture.run(fixture.config("root")).unwrap();
    assert_eq!(fixture.rows().len(), 4);

    fs::remove_file(fixture.path("docs/guide.pdf")).unwrap();
    fixture.run(fixture.config("root")).unwrap();

    let rows = fixture.rows();
    assert_eq!(rows.len(), 3);
    assert!(!ids(&rows).contains("docs/guide.pdf"));
    assert!(rows
        .iter()
        .all(|r| r.iter().all(|cell| *cell != CellValue::Empty)));
}

#[test]
fn missing_spreadsheet_id_touches_nothing() {
    let fixture = Fixture::new();
    let before = fs::read(fixture.books.path().join("inventory.json")).unwrap();

    let mut config = fixture.config("root");
    config.properties.spreadsheet_id = Some("   ".to_string());

    match fixture.run(config).unwrap() {
        RunOutcome::NotConfigured { missing } => assert_eq!(missing, "spreadsheet_id"),
        other => panic!("Unexpected outcome: {:?}", other),
    }

    let after = fs::read(fixture.books.path().join("inventory.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn update_mode_writes_nothing() {
    let fixture = Fixture::new();
    let mut config = fixture.config("root");
    config.report.write_mode = WriteMode::Update;

    let outcome = fixture.run(config).unwrap();
    assert!(matches!(outcome, RunOutcome::UpdateUnsupported));
    assert!(fixture.rows().is_empty());
}

#[test]
fn unknown_folder_is_reported() {
    let fixture = Fixture::new();
    let result = fixture.run(fixture.config("docs/missing"));
    assert!(matches!(result, Err(InventoryError::FolderNotFound { .. })));
    assert!(fixture.rows().is_empty());
}

#[test]
fn traversal_outside_the_drive_is_rejected() {
    let fixture = Fixture::new();
    for id in ["../", "docs/../..", "/etc"] {
        let result = fixture.run(fixture.config(id));
        assert!(
            matches!(result, Err(InventoryError::FolderNotFound { .. })),
            "Should reject: {}",
            id
        );
    }
    assert!(fixture.rows().is_empty());
}

#[test]
fn names_with_spaces_and_percent_signs_are_recorded() {
    let fixture = Fixture::new();
    fs::create_dir(fixture.path("tax returns")).unwrap();
    fs::write(fixture.path("tax returns/2024 50% share.txt"), "x").unwrap();

    fixture.run(fixture.config("root")).unwrap();
    let rows = fixture.rows();
    assert_eq!(rows.len(), 5);

    let share = rows
        .iter()
        .find(|r| text(r, Column::FileName) == "2024 50% share.txt")
        .unwrap();
    assert_eq!(text(share, Column::Location), "My Drive » tax returns");
}

#[cfg(target_os = "linux")]
#[test]
fn backslash_and_non_utf8_names_are_recorded() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = Fixture::new();
    fs::write(fixture.path("a\\b.txt"), "x").unwrap();
    let latin1 = fixture.path("docs").join(OsStr::from_bytes(b"r\xe9sum\xe9"));
    fs::create_dir(&latin1).unwrap();
    fs::write(latin1.join("cv.txt"), "cv").unwrap();

    let outcome = fixture.run(fixture.config("root")).unwrap();
    assert_eq!(outcome.summary().unwrap().files_recorded, 5);

    let rows = fixture.rows();
    assert_eq!(rows.len(), 6);
    let ids = ids(&rows);
    assert!(ids.contains("a\\b.txt"));
    assert!(ids.contains("docs/r%E9sum%E9/cv.txt"));

    let cv = rows
        .iter()
        .find(|r| text(r, Column::FileName) == "cv.txt")
        .unwrap();
    assert_eq!(
        text(cv, Column::Location),
        "My Drive » docs » r\u{FFFD}sum\u{FFFD}"
    );
}

#[test]
fn create_spreadsheet_waits_for_both_properties() {
    let fixture = Fixture::new();
    let mut config = fixture.config("root");
    config.properties.root_dir_id = None;
    config.properties.spreadsheet_id = Some("fresh".to_string());

    let inventory = DriveInventory::new(config, OutputMode::Plain, 0, true);
    assert!(!inventory.ensure_spreadsheet("Drive inventory").unwrap());
    assert!(matches!(
        inventory.run().unwrap(),
        RunOutcome::NotConfigured { ref missing } if missing == "root_dir_id"
    ));
    assert!(!fixture.books.path().join("fresh.json").exists());
}

#[test]
fn missing_property_wins_over_bad_drive_root() {
    let fixture = Fixture::new();
    let mut config = fixture.config("root");
    config.properties.root_dir_id = None;
    config.storage.drive_root = fixture.path("does-not-exist");

    assert!(config.validate().is_ok());
    assert!(matches!(
        fixture.run(config).unwrap(),
        RunOutcome::NotConfigured { .. }
    ));
}
