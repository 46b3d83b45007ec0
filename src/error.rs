use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Required property {key} is not set")]
    MissingProperty { key: String },

    #[error("Folder not found: {id}")]
    FolderNotFound { id: String },

    #[error("Spreadsheet not found: {id}")]
    SpreadsheetNotFound { id: String },

    #[error("Spreadsheet {id} has no sheets")]
    NoSheets { id: String },

    #[error("Spreadsheet already exists: {id}")]
    SpreadsheetExists { id: String },

    #[error("File {file_id} has no owner")]
    MissingOwner { file_id: String },

    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    #[error("Invalid identifier: {id}")]
    InvalidId { id: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl InventoryError {
    /// Map an IO error on `path` to the closest domain error.
    pub fn from_io(error: std::io::Error, path: &std::path::Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => InventoryError::Permission {
                path: path.display().to_string(),
            },
            _ => InventoryError::Io(error),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for InventoryError {
    fn user_message(&self) -> String {
        match self {
            InventoryError::MissingProperty { key } => {
                format!("Error, variable {} not set", key)
            }
            InventoryError::FolderNotFound { id } => {
                format!("Root folder could not be resolved: {}", id)
            }
            InventoryError::SpreadsheetNotFound { id } => {
                format!("Spreadsheet could not be opened: {}", id)
            }
            InventoryError::NoSheets { id } => {
                format!("Spreadsheet {} does not contain any sheet", id)
            }
            InventoryError::MissingOwner { file_id } => {
                format!("Cannot determine the owner of file {}", file_id)
            }
            InventoryError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            InventoryError::MissingProperty { .. } => Some(
                "Set root_dir_id and spreadsheet_id under [properties] in the configuration file, or pass --root-dir-id / --spreadsheet-id.".to_string()
            ),
            InventoryError::FolderNotFound { .. } => Some(
                "Check that the folder id exists below the drive root (use 'root' for the drive root itself).".to_string()
            ),
            InventoryError::SpreadsheetNotFound { .. } => Some(
                "Create the spreadsheet first with --create-spreadsheet, or check --workbook-dir.".to_string()
            ),
            InventoryError::SpreadsheetExists { .. } => Some(
                "Drop --create-spreadsheet to write into the existing spreadsheet.".to_string()
            ),
            InventoryError::MissingOwner { .. } => Some(
                "Set owner_email under [storage] or pass --owner-email.".to_string()
            ),
            InventoryError::Permission { .. } => Some(
                "Ensure you have read access to the drive root and write access to the workbook directory.".to_string()
            ),
            InventoryError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for InventoryError {
    fn from(error: toml::de::Error) -> Self {
        InventoryError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
