use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use inventory_dashboard::config::AppConfig;
use inventory_dashboard::engine::FilterEngine;
use inventory_dashboard::export::{export_csv, export_json};
use inventory_dashboard::model::Target;
use inventory_dashboard::parser::inventory::DEFAULT_SHEET;
use inventory_dashboard::parser::load_inventory;
use inventory_dashboard::ui::App;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    Registry,
    Os,
    Dbms,
    Virtualization,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Registry => Target::Registry,
            TargetArg::Os => Target::Os,
            TargetArg::Dbms => Target::Dbms,
            TargetArg::Virtualization => Target::Virtualization,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "inventory-dashboard")]
#[command(about = "Inventory Dashboard - import substitution breakdowns of information systems")]
#[command(version)]
struct Args {
    /// Path to the inventory export (defaults to the configured data file)
    file: Option<PathBuf>,

    /// Worksheet to read from a workbook export
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Breakdown to export
    #[arg(long, value_enum, default_value_t = TargetArg::Registry)]
    target: TargetArg,

    /// Export the breakdown to CSV and exit
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Export the breakdown to JSON and exit
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = "app_config.json")]
    config: PathBuf,

    /// Write logs to this file while the dashboard is open
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

// The terminal UI owns stdout, so it only logs to an explicit file.
fn init_tracing(headless: bool, log_file: Option<&Path>) -> Result<()> {
    match (headless, log_file) {
        (_, Some(path)) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (true, None) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
        }
        (false, None) => {}
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let headless = args.csv.is_some() || args.json.is_some();
    init_tracing(headless, args.log_file.as_deref())?;

    let mut config = AppConfig::load(&args.config)?;
    if let Some(file) = &args.file {
        config.data_path = file.display().to_string();
    }

    let mut engine = FilterEngine::new();

    if headless {
        if config.data_path.is_empty() {
            return Err(eyre!("no inventory file given"));
        }
        let dataset = load_inventory(&config.data_path, &args.sheet, &config.vocabulary)?;
        engine.set_dataset(Some(dataset));
        let table = engine.breakdown(args.target.into());

        if let Some(csv_path) = &args.csv {
            export_csv(&table, csv_path)?;
            println!("Exported to CSV: {}", csv_path.display());
        }

        if let Some(json_path) = &args.json {
            export_json(&table, json_path)?;
            println!("Exported to JSON: {}", json_path.display());
        }
        return Ok(());
    }

    // A missing or broken file still opens the dashboard, empty
    let mut status = None;
    if !config.data_path.is_empty() {
        match load_inventory(&config.data_path, &args.sheet, &config.vocabulary) {
            Ok(dataset) => engine.set_dataset(Some(dataset)),
            Err(e) => status = Some(format!("Error: {e}")),
        }
    }

    let mut app = App::new(engine, config, args.config).with_sheet(args.sheet);
    app.status = status;

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}
