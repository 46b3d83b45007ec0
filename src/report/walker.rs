use crate::drive::{DriveFile, DriveService, Folder, Listing};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files: usize,
    pub folders: usize,
}

/// Depth-first walk over a folder tree.
///
/// The stack holds one pending subfolder listing per open level, so memory
/// grows with depth rather than with the size of the tree. Sibling order is
/// whatever the drive returns. Trees are assumed acyclic.
pub struct FolderWalk<'d, D: DriveService> {
    drive: &'d D,
}

impl<'d, D: DriveService> FolderWalk<'d, D> {
    pub fn new(drive: &'d D) -> Self {
        Self { drive }
    }

    /// Call `visit` once for every file below `root`, in traversal order.
    /// The first error from the drive or from `visit` stops the walk.
    pub fn walk<F>(&self, root: &Folder, mut visit: F) -> Result<WalkStats>
    where
        F: FnMut(&Folder, DriveFile) -> Result<()>,
    {
        let mut stats = WalkStats::default();
        let mut pending: Vec<Listing<'d, Folder>> = Vec::new();

        self.read_folder(root, &mut visit, &mut stats)?;
        pending.push(self.drive.subfolders(root)?);

        while let Some(listing) = pending.last_mut() {
            match listing.next() {
                Some(folder) => {
                    let folder = folder?;
                    self.read_folder(&folder, &mut visit, &mut stats)?;
                    pending.push(self.drive.subfolders(&folder)?);
                }
                None => {
                    pending.pop();
                }
            }
        }

        Ok(stats)
    }

    fn read_folder<F>(&self, folder: &Folder, visit: &mut F, stats: &mut WalkStats) -> Result<()>
    where
        F: FnMut(&Folder, DriveFile) -> Result<()>,
    {
        log::info!("Reading folder {}...", folder.name);
        stats.folders += 1;

        for file in self.drive.files(folder)? {
            visit(folder, file?)?;
            stats.files += 1;
        }

        Ok(())
    }
}
