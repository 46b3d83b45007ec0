pub mod cli;
pub mod config;
pub mod drive;
pub mod error;
pub mod report;
pub mod sheets;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ReportTarget, WriteMode};
pub use error::{InventoryError, Result, UserFriendlyError};

// Core functionality re-exports
pub use drive::{DriveFile, DriveService, Folder, LocalDrive, MemoryDrive};
pub use report::{FileRecord, RunOutcome, RunPlan, RunSummary, SheetWriter, WriteOutcome};
pub use sheets::{CellValue, JsonWorkbookStore, Sheet, Spreadsheet, SpreadsheetService};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::time::Instant;

/// Main library interface: lists a folder tree into a spreadsheet.
pub struct DriveInventory {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl DriveInventory {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Info logs and the spinner would fight over the terminal.
        let show_progress = !quiet && verbose == 0 && output_mode == OutputMode::Human;
        let progress_manager = ProgressManager::new(show_progress);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Run against the configured local drive and workbook directory.
    pub fn run(&self) -> Result<RunOutcome> {
        let target = match self.target() {
            Ok(target) => target,
            Err(InventoryError::MissingProperty { key }) => {
                log::error!("Error, variable {} not set", key);
                return Ok(RunOutcome::NotConfigured { missing: key });
            }
            Err(e) => return Err(e),
        };

        let drive = LocalDrive::from_config(&self.config.storage)?;
        let sheets = JsonWorkbookStore::new(&self.config.report.workbook_dir);
        self.run_target(&target, &drive, &sheets)
    }

    /// Run against arbitrary backends.
    pub fn run_with<D, S>(&self, drive: &D, sheets: &S) -> Result<RunOutcome>
    where
        D: DriveService,
        S: SpreadsheetService,
    {
        match self.target() {
            Ok(target) => self.run_target(&target, drive, sheets),
            Err(InventoryError::MissingProperty { key }) => {
                log::error!("Error, variable {} not set", key);
                Ok(RunOutcome::NotConfigured { missing: key })
            }
            Err(e) => Err(e),
        }
    }

    fn target(&self) -> Result<ReportTarget> {
        self.config.properties.resolve()
    }

    fn run_target<D, S>(&self, target: &ReportTarget, drive: &D, sheets: &S) -> Result<RunOutcome>
    where
        D: DriveService,
        S: SpreadsheetService,
    {
        let start_time = Instant::now();
        self.output_formatter.start_operation("Building file inventory");

        log::info!("getting root folder {}", target.root_dir_id);
        let root_folder = drive.folder_by_id(&target.root_dir_id)?;
        log::info!("... got it. The folder is named {}", root_folder.name);

        log::info!("loading spreadsheet with id: {}", target.spreadsheet_id);
        let mut book = sheets.open_by_id(&target.spreadsheet_id)?;
        let spreadsheet_name = book.name().to_string();
        let spreadsheet_url = book.url();
        log::info!("... spreadsheet loaded. Its name is {}", spreadsheet_name);

        let mut sheet = Sheet::first(&mut book)?;
        let sheet_name = sheet.name().to_string();

        let writer = SheetWriter::new(self.config.report.write_mode)
            .with_progress_interval(self.config.report.progress_interval);

        let record_progress = self.progress_manager.create_record_progress();
        let mut bytes_recorded = 0u64;
        let outcome = writer.write(drive, &root_folder, &mut sheet, |recorded, record| {
            bytes_recorded += record.size;
            ui::progress::update_record_progress(&record_progress, recorded, record);
        });

        let stats = match outcome {
            Ok(WriteOutcome::Written(stats)) => stats,
            Ok(WriteOutcome::Skipped) => {
                record_progress.finish_and_clear();
                return Ok(RunOutcome::UpdateUnsupported);
            }
            Err(e) => {
                record_progress.abandon_with_message("Inventory aborted");
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &record_progress,
            &format!("Recorded {} files", stats.files),
            start_time.elapsed(),
        );

        log::info!("Processing done; spreadsheet is at {}", spreadsheet_url);

        Ok(RunOutcome::Completed(RunSummary {
            root_folder,
            spreadsheet_id: target.spreadsheet_id.clone(),
            spreadsheet_name,
            spreadsheet_url,
            sheet_name,
            files_recorded: stats.files,
            folders_visited: stats.folders,
            bytes_recorded,
            elapsed: start_time.elapsed(),
            finished_at: chrono::Utc::now(),
        }))
    }

    /// Resolve the folder and spreadsheet a run would use without writing.
    pub fn plan(&self) -> Result<RunPlan> {
        let target = self.target()?;
        let drive = LocalDrive::from_config(&self.config.storage)?;
        let sheets = JsonWorkbookStore::new(&self.config.report.workbook_dir);
        self.plan_with(&target, &drive, &sheets)
    }

    fn plan_with<D, S>(&self, target: &ReportTarget, drive: &D, sheets: &S) -> Result<RunPlan>
    where
        D: DriveService,
        S: SpreadsheetService,
    {
        let root_folder = drive.folder_by_id(&target.root_dir_id)?;
        let mut book = sheets.open_by_id(&target.spreadsheet_id)?;
        let spreadsheet_name = book.name().to_string();
        let sheet_name = Sheet::first(&mut book)?.name().to_string();

        Ok(RunPlan {
            root_folder,
            spreadsheet_id: target.spreadsheet_id.clone(),
            spreadsheet_name,
            sheet_name,
            write_mode: self.config.report.write_mode,
        })
    }

    /// Create the configured spreadsheet unless it already exists.
    ///
    /// Returns `false` when nothing was created, including when either
    /// property is missing; the run reports that case itself.
    pub fn ensure_spreadsheet(&self, name: &str) -> Result<bool> {
        let target = match self.target() {
            Ok(target) => target,
            Err(InventoryError::MissingProperty { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        let id = target.spreadsheet_id.as_str();

        let store = JsonWorkbookStore::new(&self.config.report.workbook_dir);
        if store.exists(id) {
            log::debug!("Spreadsheet {} already exists", id);
            return Ok(false);
        }

        store.create(id, name)?;
        self.output_formatter
            .success(&format!("Created spreadsheet {} ({})", name, id));
        Ok(true)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let path = output_path.as_ref();
        std::fs::write(path, Config::create_sample_config())
            .map_err(|e| InventoryError::from_io(e, path))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &InventoryError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
