use crate::config::StorageConfig;
use crate::drive::{DriveFile, DriveService, Folder, Listing};
use crate::error::{InventoryError, Result};
use chrono::{DateTime, Utc};
use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use url::Url;
use walkdir::{DirEntry, WalkDir};

/// Identifier of the drive root folder.
pub const ROOT_ID: &str = "root";

/// A directory on disk exposed as a drive.
///
/// Entry ids are `/`-separated paths relative to the drive root. Within a
/// segment `%` is written as `%25` and bytes that are not UTF-8 as `%XX`,
/// so every on-disk name maps to exactly one id. A top-level entry literally
/// named `root` gets the id `./root` so it never collides with [`ROOT_ID`].
#[derive(Debug, Clone)]
pub struct LocalDrive {
    root: PathBuf,
    name: String,
    owner_email: Option<String>,
}

impl LocalDrive {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let not_a_dir = || InventoryError::Config {
            message: format!("Drive root is not a directory: {}", root.display()),
        };

        let canonical = root.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_a_dir(),
            _ => InventoryError::from_io(e, root),
        })?;

        if !canonical.is_dir() {
            return Err(not_a_dir());
        }
        let root = canonical;

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        Ok(Self {
            root,
            name,
            owner_email: None,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let drive = Self::new(&config.drive_root)?.with_owner_email(config.owner_email.clone());

        Ok(match config.drive_name {
            Some(ref name) => drive.with_name(name),
            None => drive,
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_owner_email(mut self, email: Option<String>) -> Self {
        self.owner_email = email;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &str) -> Result<PathBuf> {
        if id == ROOT_ID {
            return Ok(self.root.clone());
        }

        let relative = id.strip_prefix("./").unwrap_or(id);
        let invalid = || InventoryError::InvalidId { id: id.to_string() };

        if relative.is_empty() {
            return Err(invalid());
        }

        let mut path = self.root.clone();
        for segment in relative.split('/') {
            let name = decode_segment(segment).ok_or_else(invalid)?;
            // Exactly one plain component: no separators, `.` or `..`.
            let mut components = Path::new(&name).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) if part == name.as_os_str() => {
                    path.push(part)
                }
                _ => return Err(invalid()),
            }
        }

        Ok(path)
    }

    fn id_for(&self, path: &Path) -> String {
        let relative = match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => return ROOT_ID.to_string(),
        };

        let id = relative
            .components()
            .map(|c| encode_segment(c.as_os_str()))
            .collect::<Vec<_>>()
            .join("/");

        if id == ROOT_ID {
            format!("./{}", id)
        } else {
            id
        }
    }

    fn folder_for(&self, path: &Path) -> Folder {
        let name = if path == self.root {
            self.name.clone()
        } else {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        };

        Folder::new(self.id_for(path), name)
    }

    fn file_for(&self, path: &Path, metadata: &Metadata) -> Result<DriveFile> {
        let url = Url::from_file_path(path)
            .map_err(|_| InventoryError::InvalidId {
                id: path.display().to_string(),
            })?
            .to_string();

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        // Not every filesystem records a birth time.
        let created = metadata.created().unwrap_or(modified);

        Ok(DriveFile {
            id: self.id_for(path),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            url,
            owner: self.owner_email.clone(),
            mime_type: mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            created: DateTime::<Utc>::from(created),
            updated: DateTime::<Utc>::from(modified),
            size: metadata.len(),
        })
    }

    fn entries(&self, folder: &Folder) -> Result<impl Iterator<Item = Result<DirEntry>>> {
        let path = self.resolve(&folder.id)?;
        if !path.is_dir() {
            return Err(InventoryError::FolderNotFound {
                id: folder.id.clone(),
            });
        }

        Ok(WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .map(|entry| entry.map_err(walk_error)))
    }
}

fn walk_error(error: walkdir::Error) -> InventoryError {
    let path = error.path().map(Path::to_path_buf).unwrap_or_default();
    match error.into_io_error() {
        Some(io) => InventoryError::from_io(io, &path),
        None => InventoryError::InvalidId {
            id: path.display().to_string(),
        },
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%25");
        } else {
            out.push(c);
        }
    }
}

#[cfg(unix)]
fn encode_segment(name: &OsStr) -> String {
    use std::os::unix::ffi::OsStrExt;

    let mut out = String::new();
    let mut rest = name.as_bytes();
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                push_escaped(&mut out, valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                push_escaped(&mut out, std::str::from_utf8(valid).unwrap_or_default());
                let bad = e.error_len().unwrap_or(after.len());
                for byte in &after[..bad] {
                    out.push_str(&format!("%{:02X}", byte));
                }
                rest = &after[bad..];
            }
        }
    }
    out
}

#[cfg(not(unix))]
fn encode_segment(name: &OsStr) -> String {
    let mut out = String::new();
    push_escaped(&mut out, &name.to_string_lossy());
    out
}

fn decode_bytes(segment: &str) -> Option<Vec<u8>> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

#[cfg(unix)]
fn decode_segment(segment: &str) -> Option<OsString> {
    use std::os::unix::ffi::OsStringExt;

    decode_bytes(segment).map(OsString::from_vec)
}

#[cfg(not(unix))]
fn decode_segment(segment: &str) -> Option<OsString> {
    decode_bytes(segment)
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map(OsString::from)
}

impl DriveService for LocalDrive {
    fn folder_by_id(&self, id: &str) -> Result<Folder> {
        let path = self
            .resolve(id)
            .map_err(|_| InventoryError::FolderNotFound { id: id.to_string() })?;

        if !path.is_dir() {
            return Err(InventoryError::FolderNotFound { id: id.to_string() });
        }

        Ok(self.folder_for(&path))
    }

    fn files<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, DriveFile>> {
        let files = self.entries(folder)?.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            if !entry.file_type().is_file() {
                return None;
            }

            Some(
                entry
                    .metadata()
                    .map_err(walk_error)
                    .and_then(|metadata| self.file_for(entry.path(), &metadata)),
            )
        });

        Ok(Box::new(files))
    }

    fn subfolders<'a>(&'a self, folder: &Folder) -> Result<Listing<'a, Folder>> {
        let folders = self.entries(folder)?.filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(Ok(self.folder_for(entry.path()))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        });

        Ok(Box::new(folders))
    }

    fn parents(&self, id: &str) -> Result<Vec<Folder>> {
        let path = self.resolve(id)?;
        if path == self.root {
            return Ok(Vec::new());
        }

        Ok(path
            .parent()
            .map(|parent| vec![self.folder_for(parent)])
            .unwrap_or_default())
    }
}
