pub mod local;
pub mod memory;

pub use local::LocalDrive;
pub use memory::MemoryDrive;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lazy, single-pass listing. Items are produced as the backend reads them
/// and the iterator cannot be restarted.
pub type Listing<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Metadata of a single stored file as reported by a [`DriveService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner: Option<String>,
    pub mime_type: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub size: u64,
}

/// Read-only folder/file service.
///
/// Identifiers are opaque strings owned by the backend. File and folder ids
/// share one namespace so that [`DriveService::parents`] works for both.
pub trait DriveService {
    fn folder_by_id(&self, id: &str) -> Result<Folder>;

    /// Direct files of `folder`, no recursion.
    fn files<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, DriveFile>>;

    /// Direct subfolders of `folder`, no recursion.
    fn subfolders<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, Folder>>;

    /// Folders directly containing the file or folder `id`. Empty for the
    /// top of the storage and for orphaned entries.
    fn parents(&self, id: &str) -> Result<Vec<Folder>>;
}
