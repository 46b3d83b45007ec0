use crate::drive::{DriveFile, DriveService};
use crate::error::{InventoryError, Result};
use crate::report::location::location_string;
use crate::sheets::CellValue;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output columns, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Location,
    FileName,
    Url,
    Owner,
    Type,
    Created,
    Updated,
    FileId,
    Size,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Location,
        Column::FileName,
        Column::Url,
        Column::Owner,
        Column::Type,
        Column::Created,
        Column::Updated,
        Column::FileId,
        Column::Size,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Location => "location",
            Column::FileName => "fileName",
            Column::Url => "URL",
            Column::Owner => "owner",
            Column::Type => "type",
            Column::Created => "created",
            Column::Updated => "updated",
            Column::FileId => "fileID",
            Column::Size => "size",
        }
    }

    pub fn position(self) -> usize {
        Column::ALL
            .iter()
            .position(|c| *c == self)
            .unwrap_or_default()
    }
}

pub fn header_row() -> Vec<CellValue> {
    Column::ALL.iter().map(|c| CellValue::from(c.header())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub file_id: String,
    pub location: String,
    pub file_name: String,
    pub url: String,
    pub owner: String,
    pub mime_type: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub size: u64,
}

impl FileRecord {
    /// Build the record for `file`, resolving its location through `drive`.
    /// Fails when the file has no owner.
    pub fn from_file<D: DriveService>(drive: &D, file: DriveFile) -> Result<Self> {
        let location = location_string(drive, &file.id)?;
        let owner = file.owner.ok_or_else(|| InventoryError::MissingOwner {
            file_id: file.id.clone(),
        })?;

        Ok(Self {
            file_id: file.id,
            location,
            file_name: file.name,
            url: file.url,
            owner,
            mime_type: file.mime_type,
            created: file.created,
            updated: file.updated,
            size: file.size,
        })
    }

    pub fn value(&self, column: Column) -> CellValue {
        match column {
            Column::Location => CellValue::from(self.location.as_str()),
            Column::FileName => CellValue::from(self.file_name.as_str()),
            Column::Url => CellValue::from(self.url.as_str()),
            Column::Owner => CellValue::from(self.owner.as_str()),
            Column::Type => CellValue::from(self.mime_type.as_str()),
            Column::Created => CellValue::from(self.created),
            Column::Updated => CellValue::from(self.updated),
            Column::FileId => CellValue::from(self.file_id.as_str()),
            Column::Size => CellValue::from(self.size),
        }
    }

    pub fn to_row(&self) -> Vec<CellValue> {
        Column::ALL.iter().map(|c| self.value(*c)).collect()
    }
}
