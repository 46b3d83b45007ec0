use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ROOT_DIR_ID: &str = "root_dir_id";
pub const SPREADSHEET_ID: &str = "spreadsheet_id";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub properties: PropertiesConfig,
    pub storage: StorageConfig,
    pub report: ReportConfig,
}

/// The two identifiers a report run needs. Either may be absent; a run
/// without them stops after logging which one is missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PropertiesConfig {
    pub root_dir_id: Option<String>,
    pub spreadsheet_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub drive_root: PathBuf,
    pub drive_name: Option<String>,
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub workbook_dir: PathBuf,
    pub progress_interval: usize,
    pub write_mode: WriteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Clear the sheet and rewrite every row.
    #[default]
    Overwrite,
    /// Merge into existing rows. Not implemented.
    Update,
}

/// Identifiers resolved from [`PropertiesConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    pub root_dir_id: String,
    pub spreadsheet_id: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            drive_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            drive_name: None,
            owner_email: default_owner_email(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            workbook_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            progress_interval: 20,
            write_mode: WriteMode::Overwrite,
        }
    }
}

fn default_owner_email() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|user| !user.trim().is_empty())
        .map(|user| format!("{}@localhost", user.trim()))
}

impl PropertiesConfig {
    pub fn resolve(&self) -> Result<ReportTarget> {
        let root_dir_id = require(ROOT_DIR_ID, self.root_dir_id.as_deref())?;
        let spreadsheet_id = require(SPREADSHEET_ID, self.spreadsheet_id.as_deref())?;

        Ok(ReportTarget {
            root_dir_id,
            spreadsheet_id,
        })
    }
}

fn require(key: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(InventoryError::MissingProperty {
            key: key.to_string(),
        }),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InventoryError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| InventoryError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| InventoryError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["drive-inventory.toml", ".drive-inventory.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref id) = cli_args.root_dir_id {
            self.properties.root_dir_id = Some(id.clone());
        }

        if let Some(ref id) = cli_args.spreadsheet_id {
            self.properties.spreadsheet_id = Some(id.clone());
        }

        if let Some(ref root) = cli_args.drive_root {
            self.storage.drive_root = root.clone();
        }

        if let Some(ref email) = cli_args.owner_email {
            self.storage.owner_email = Some(email.clone());
        }

        if let Some(ref dir) = cli_args.workbook_dir {
            self.report.workbook_dir = dir.clone();
        }

        if let Some(mode) = cli_args.write_mode {
            self.report.write_mode = mode;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| InventoryError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| InventoryError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    /// Checks structural settings only. Missing identifiers are not a
    /// validation failure, and neither is the drive root: both are only
    /// looked at once a run has its identifiers.
    pub fn validate(&self) -> Result<()> {
        if self.report.progress_interval == 0 {
            return Err(InventoryError::Config {
                message: "Progress interval must be greater than 0".to_string(),
            });
        }

        if let Some(ref email) = self.storage.owner_email {
            if !email.contains('@') {
                return Err(InventoryError::Config {
                    message: format!("Owner email is not an address: {}", email),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.properties.root_dir_id = Some("root".to_string());
        sample_config.properties.spreadsheet_id = Some("inventory".to_string());
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub root_dir_id: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub drive_root: Option<PathBuf>,
    pub owner_email: Option<String>,
    pub workbook_dir: Option<PathBuf>,
    pub write_mode: Option<WriteMode>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir_id(mut self, id: Option<String>) -> Self {
        self.root_dir_id = id;
        self
    }

    pub fn with_spreadsheet_id(mut self, id: Option<String>) -> Self {
        self.spreadsheet_id = id;
        self
    }

    pub fn with_drive_root(mut self, root: Option<PathBuf>) -> Self {
        self.drive_root = root;
        self
    }

    pub fn with_owner_email(mut self, email: Option<String>) -> Self {
        self.owner_email = email;
        self
    }

    pub fn with_workbook_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.workbook_dir = dir;
        self
    }

    pub fn with_write_mode(mut self, mode: Option<WriteMode>) -> Self {
        self.write_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.properties.root_dir_id.is_none());
        assert!(config.properties.spreadsheet_id.is_none());
        assert_eq!(config.report.progress_interval, 20);
        assert_eq!(config.report.write_mode, WriteMode::Overwrite);
    }

    #[test]
    fn test_resolve_requires_both_properties() {
        let mut properties = PropertiesConfig::default();
        match properties.resolve() {
            Err(InventoryError::MissingProperty { key }) => assert_eq!(key, ROOT_DIR_ID),
            other => panic!("unexpected: {:?}", other),
        }

        properties.root_dir_id = Some("root".to_string());
        match properties.resolve() {
            Err(InventoryError::MissingProperty { key }) => assert_eq!(key, SPREADSHEET_ID),
            other => panic!("unexpected: {:?}", other),
        }

        properties.spreadsheet_id = Some("   ".to_string());
        assert!(properties.resolve().is_err());

        properties.spreadsheet_id = Some("sheet".to_string());
        let target = properties.resolve().unwrap();
        assert_eq!(target.root_dir_id, "root");
        assert_eq!(target.spreadsheet_id, "sheet");
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.drive_root = temp_dir.path().to_path_buf();
        config.storage.owner_email = Some("me@example.com".to_string());
        assert!(config.validate().is_ok());

        config.report.progress_interval = 0;
        assert!(config.validate().is_err());
        config.report.progress_interval = 20;

        config.storage.owner_email = Some("not-an-address".to_string());
        assert!(config.validate().is_err());
        config.storage.owner_email = None;

        config.storage.drive_root = temp_dir.path().join("missing");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.properties.root_dir_id = Some("photos/2024".to_string());
        config.report.write_mode = WriteMode::Update;
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.properties.root_dir_id.as_deref(), Some("photos/2024"));
        assert!(loaded.properties.spreadsheet_id.is_none());
        assert_eq!(loaded.report.write_mode, WriteMode::Update);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.toml");
        std::fs::write(&path, "[properties]\nspreadsheet_id = \"abc\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.properties.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(config.report.progress_interval, 20);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_root_dir_id(Some("docs".to_string()))
            .with_spreadsheet_id(Some("report".to_string()))
            .with_write_mode(Some(WriteMode::Update));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.properties.root_dir_id.as_deref(), Some("docs"));
        assert_eq!(config.properties.spreadsheet_id.as_deref(), Some("report"));
        assert_eq!(config.report.write_mode, WriteMode::Update);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[properties]"));
        assert!(sample.contains("[storage]"));
        assert!(sample.contains("[report]"));
        assert!(sample.contains("root_dir_id = \"root\""));
    }
}
