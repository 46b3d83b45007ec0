use crate::error::{InventoryError, Result};
use crate::sheets::{check_block, CellValue, Spreadsheet, SpreadsheetService};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkbookDocument {
    name: String,
    sheets: Vec<SheetDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SheetDocument {
    name: String,
    #[serde(default)]
    rows: Vec<Vec<CellValue>>,
}

/// Directory of spreadsheets, one `<id>.json` document each.
#[derive(Debug, Clone)]
pub struct JsonWorkbookStore {
    dir: PathBuf,
}

impl JsonWorkbookStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && id
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(InventoryError::InvalidId { id: id.to_string() });
        }

        Ok(self.dir.join(format!("{}.json", id)))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Create an empty spreadsheet holding a single sheet.
    pub fn create(&self, id: &str, name: &str) -> Result<JsonWorkbook> {
        let path = self.path_for(id)?;
        if path.exists() {
            return Err(InventoryError::SpreadsheetExists { id: id.to_string() });
        }

        fs::create_dir_all(&self.dir).map_err(|e| InventoryError::from_io(e, &self.dir))?;

        let book = JsonWorkbook {
            id: id.to_string(),
            path,
            document: WorkbookDocument {
                name: name.to_string(),
                sheets: vec![SheetDocument {
                    name: DEFAULT_SHEET_NAME.to_string(),
                    rows: Vec::new(),
                }],
            },
        };
        book.persist()?;

        log::debug!("Created spreadsheet {} at {}", id, book.path.display());
        Ok(book)
    }
}

impl SpreadsheetService for JsonWorkbookStore {
    type Book = JsonWorkbook;

    fn open_by_id(&self, id: &str) -> Result<JsonWorkbook> {
        let path = self
            .path_for(id)
            .map_err(|_| InventoryError::SpreadsheetNotFound { id: id.to_string() })?;

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InventoryError::SpreadsheetNotFound { id: id.to_string() })
            }
            Err(e) => return Err(InventoryError::from_io(e, &path)),
        };

        let document: WorkbookDocument = serde_json::from_reader(BufReader::new(file))?;

        Ok(JsonWorkbook {
            id: id.to_string(),
            path,
            document,
        })
    }
}

/// An opened JSON spreadsheet. Every mutation is written back to disk
/// before the call returns.
#[derive(Debug, Clone)]
pub struct JsonWorkbook {
    id: String,
    path: PathBuf,
    document: WorkbookDocument,
}

impl JsonWorkbook {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sheet_mut(&mut self, sheet: usize) -> Result<&mut SheetDocument> {
        let id = &self.id;
        self.document
            .sheets
            .get_mut(sheet)
            .ok_or_else(|| InventoryError::NoSheets { id: id.clone() })
    }

    fn persist(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(dir).map_err(|e| InventoryError::from_io(e, dir))?;

        write_document(temp.as_file(), &self.document, &self.path)?;

        temp.persist(&self.path)
            .map_err(|e| InventoryError::from_io(e.error, &self.path))?;
        Ok(())
    }
}

fn write_document<W: Write>(out: W, document: &WorkbookDocument, path: &Path) -> Result<()> {
    let io_error = |e: std::io::Error| InventoryError::from_io(e, path);

    let mut writer = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|e| {
        if e.is_io() {
            io_error(e.into())
        } else {
            InventoryError::from(e)
        }
    })?;
    writer.flush().map_err(io_error)
}

impl Spreadsheet for JsonWorkbook {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.document.name
    }

    fn url(&self) -> String {
        self.path
            .canonicalize()
            .ok()
            .and_then(|p| Url::from_file_path(p).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn sheet_names(&self) -> Vec<String> {
        self.document.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn clear_contents(&mut self, sheet: usize) -> Result<()> {
        self.sheet_mut(sheet)?.rows.clear();
        self.persist()
    }

    fn set_values(
        &mut self,
        sheet: usize,
        row: usize,
        column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<()> {
        let width = check_block(row, column, values)?;
        let target = self.sheet_mut(sheet)?;

        let last_row = row - 1 + values.len();
        if target.rows.len() < last_row {
            target.rows.resize(last_row, Vec::new());
        }

        let last_column = column - 1 + width;
        for (offset, block_row) in values.iter().enumerate() {
            let cells = &mut target.rows[row - 1 + offset];
            if cells.len() < last_column {
                cells.resize(last_column, CellValue::Empty);
            }
            cells[column - 1..last_column].clone_from_slice(block_row);
        }

        self.persist()
    }

    fn values(&self, sheet: usize) -> Result<Vec<Vec<CellValue>>> {
        self.document
            .sheets
            .get(sheet)
            .map(|s| s.rows.clone())
            .ok_or_else(|| InventoryError::NoSheets {
                id: self.id.clone(),
            })
    }
}
