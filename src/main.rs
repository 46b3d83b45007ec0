use clap::Parser;
use drive_inventory::{
    Cli, DriveInventory, InventoryError, OutputFormatter, OutputMode, RunOutcome, UserFriendlyError,
};
use std::process;
use std::sync::Arc;
use tokio::task;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let inventory = match DriveInventory::from_cli(&cli) {
        Ok(inventory) => inventory,
        Err(e) => {
            print_startup_error(&e);
            return exit_code(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&inventory);
    }

    if let Some(ref name) = cli.create_spreadsheet {
        if let Err(e) = inventory.ensure_spreadsheet(name) {
            inventory.handle_error(&e);
            return exit_code(&e);
        }
    }

    // Walking and writing are blocking filesystem work.
    let inventory = Arc::new(inventory);
    let worker = Arc::clone(&inventory);
    let result = match task::spawn_blocking(move || worker.run()).await {
        Ok(result) => result,
        Err(e) => Err(InventoryError::Config {
            message: format!("Inventory task failed: {}", e),
        }),
    };

    match result {
        Ok(RunOutcome::Completed(summary)) => {
            inventory.output_formatter().print_run_summary(&summary);
            0
        }
        Ok(RunOutcome::NotConfigured { missing }) => {
            inventory
                .output_formatter()
                .warning(&format!("Nothing done: {} is not set", missing));
            0
        }
        Ok(RunOutcome::UpdateUnsupported) => {
            inventory
                .output_formatter()
                .warning("Update mode is not supported yet; the spreadsheet was left unchanged");
            0
        }
        Err(e) => {
            inventory.handle_error(&e);
            exit_code(&e)
        }
    }
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_logging(cli: &Cli) {
    let env = env_logger::Env::default().default_filter_or(cli.log_filter());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

fn exit_code(error: &InventoryError) -> i32 {
    match error {
        InventoryError::MissingProperty { .. } => 0,
        InventoryError::FolderNotFound { .. } => 2,
        InventoryError::SpreadsheetNotFound { .. } => 3,
        InventoryError::Permission { .. } => 4,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "drive-inventory.toml".to_string());

    match DriveInventory::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  drive-inventory --config {}", config_path);
            println!("\nSet root_dir_id and spreadsheet_id before running.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(inventory: &DriveInventory) -> i32 {
    let formatter = inventory.output_formatter();

    formatter.info("DRY RUN MODE - the spreadsheet will not be modified");
    formatter.print_separator();

    let config = inventory.config();
    if formatter.mode() != OutputMode::Json {
        println!("  Drive root:     {}", config.storage.drive_root.display());
        println!("  Workbook dir:   {}", config.report.workbook_dir.display());
        if let Some(ref owner) = config.storage.owner_email {
            println!("  Owner:          {}", owner);
        }
    }

    match inventory.plan() {
        Ok(plan) => {
            formatter.print_run_plan(&plan);
            formatter.print_separator();
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            inventory.handle_error(&e);
            exit_code(&e)
        }
    }
}

fn print_startup_error(error: &InventoryError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
