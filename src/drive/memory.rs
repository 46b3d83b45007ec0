use crate::drive::{DriveFile, DriveService, Folder, Listing};
use crate::error::{InventoryError, Result};
use std::collections::HashMap;

/// Drive held entirely in memory.
///
/// Unlike [`crate::drive::LocalDrive`] it can model entries with several
/// parents or none at all, which is how hosted drives behave.
#[derive(Debug, Clone, Default)]
pub struct MemoryDrive {
    folders: HashMap<String, Folder>,
    files: HashMap<String, DriveFile>,
    parents: HashMap<String, Vec<String>>,
    child_files: HashMap<String, Vec<String>>,
    child_folders: HashMap<String, Vec<String>>,
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&mut self, id: &str, name: &str, parent: Option<&str>) -> &mut Self {
        self.folders.insert(id.to_string(), Folder::new(id, name));

        let parents: Vec<String> = parent.into_iter().map(str::to_string).collect();
        for parent_id in &parents {
            self.child_folders
                .entry(parent_id.clone())
                .or_default()
                .push(id.to_string());
        }
        self.parents.insert(id.to_string(), parents);
        self
    }

    pub fn add_file(&mut self, file: DriveFile, parents: &[&str]) -> &mut Self {
        let id = file.id.clone();
        for parent_id in parents {
            self.child_files
                .entry(parent_id.to_string())
                .or_default()
                .push(id.clone());
        }
        self.parents
            .insert(id.clone(), parents.iter().map(|p| p.to_string()).collect());
        self.files.insert(id, file);
        self
    }

    fn known_folder(&self, folder: &Folder) -> Result<()> {
        if self.folders.contains_key(&folder.id) {
            Ok(())
        } else {
            Err(InventoryError::FolderNotFound {
                id: folder.id.clone(),
            })
        }
    }
}

impl DriveService for MemoryDrive {
    fn folder_by_id(&self, id: &str) -> Result<Folder> {
        self.folders
            .get(id)
            .cloned()
            .ok_or_else(|| InventoryError::FolderNotFound { id: id.to_string() })
    }

    fn files<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, DriveFile>> {
        self.known_folder(folder)?;
        let ids = self.child_files.get(&folder.id).cloned().unwrap_or_default();

        Ok(Box::new(ids.into_iter().map(move |id| {
            self.files
                .get(&id)
                .cloned()
                .ok_or(InventoryError::InvalidId { id })
        })))
    }

    fn subfolders<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, Folder>> {
        self.known_folder(folder)?;
        let ids = self.child_folders.get(&folder.id).cloned().unwrap_or_default();

        Ok(Box::new(ids.into_iter().map(move |id| {
            self.folders
                .get(&id)
                .cloned()
                .ok_or(InventoryError::FolderNotFound { id })
        })))
    }

    fn parents(&self, id: &str) -> Result<Vec<Folder>> {
        let parent_ids = self
            .parents
            .get(id)
            .ok_or_else(|| InventoryError::InvalidId { id: id.to_string() })?;

        parent_ids
            .iter()
            .map(|parent| self.folder_by_id(parent))
            .collect()
    }
}
