use crate::config::{CliOverrides, Config, WriteMode};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_SPREADSHEET_NAME: &str = "Drive inventory";

#[derive(Parser, Debug)]
#[command(name = "drive-inventory")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List every file under a folder tree into a spreadsheet")]
#[command(
    long_about = "drive-inventory walks a folder tree and writes one spreadsheet row per file: \
                  location, name, URL, owner, MIME type, timestamps, id and size. \
                  Each run replaces the previous content of the first sheet."
)]
#[command(after_help = "EXAMPLES:\n  \
    drive-inventory --root-dir-id root --spreadsheet-id inventory\n  \
    drive-inventory --drive-root ~/Drive --root-dir-id projects/2024 --spreadsheet-id q1 --create-spreadsheet\n  \
    drive-inventory --config inventory.toml --output-format json\n  \
    drive-inventory --generate-config --config inventory.toml")]
pub struct Cli {
    /// Folder to inventory (`root` for the top of the drive)
    #[arg(long, env = "ROOT_DIR_ID")]
    pub root_dir_id: Option<String>,

    /// Spreadsheet receiving the rows
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directory served as the drive
    #[arg(long)]
    pub drive_root: Option<PathBuf>,

    /// Directory holding spreadsheets
    #[arg(long)]
    pub workbook_dir: Option<PathBuf>,

    /// Owner address recorded for every file
    #[arg(long, value_parser = validate_email)]
    pub owner_email: Option<String>,

    /// Merge into existing rows instead of rewriting (not supported yet)
    #[arg(long)]
    pub update: bool,

    /// Create the spreadsheet first if it does not exist
    #[arg(
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = DEFAULT_SPREADSHEET_NAME
    )]
    pub create_spreadsheet: Option<String>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Resolve the folder and spreadsheet without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let write_mode = if self.update {
            Some(WriteMode::Update)
        } else {
            None
        };

        CliOverrides::new()
            .with_root_dir_id(self.root_dir_id.clone())
            .with_spreadsheet_id(self.spreadsheet_id.clone())
            .with_drive_root(self.drive_root.clone())
            .with_owner_email(self.owner_email.clone())
            .with_workbook_dir(self.workbook_dir.clone())
            .with_write_mode(write_mode)
    }

    /// Filter handed to the logger when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "drive_inventory=error";
        }

        match self.verbose {
            0 => "drive_inventory=warn",
            1 => "drive_inventory=info",
            2 => "drive_inventory=debug",
            _ => "drive_inventory=trace",
        }
    }
}

pub fn validate_email(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();
    let (local, domain) = s
        .split_once('@')
        .ok_or_else(|| "Owner must be an email address (e.g. me@example.com)".to_string())?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err("Owner must be an email address (e.g. me@example.com)".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err("Owner email cannot contain whitespace".to_string());
    }

    Ok(s.to_string())
}
