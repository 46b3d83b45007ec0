pub mod location;
pub mod record;
pub mod walker;
pub mod writer;

pub use location::{location_string, SEPARATOR};
pub use record::{header_row, Column, FileRecord};
pub use walker::{FolderWalk, WalkStats};
pub use writer::{SheetWriter, WriteOutcome, FIRST_DATA_ROW};

use crate::config::WriteMode;
use crate::drive::Folder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root_folder: Folder,
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub spreadsheet_url: String,
    pub sheet_name: String,
    pub files_recorded: usize,
    pub folders_visited: usize,
    pub bytes_recorded: u64,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

/// What a dry run would do.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub root_folder: Folder,
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub sheet_name: String,
    pub write_mode: WriteMode,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// A required property was missing. Nothing was read or written.
    NotConfigured { missing: String },
    UpdateUnsupported,
}

impl RunOutcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}
