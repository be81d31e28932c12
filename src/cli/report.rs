//! Report and export CLI commands

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use crate::config::settings::Settings;
use crate::display::report::format_report_table;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_ledger_csv, export_report_csv, export_report_json, export_report_yaml};
use crate::services::{FeeSchedule, PaymentReport};
use crate::storage::RosterRepository;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Terminal table
    Table,
    /// CSV, one row per child
    Csv,
    /// JSON with export metadata
    Json,
    /// YAML with export metadata
    Yaml,
}

/// Arguments of the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Roster file (JSON)
    pub roster: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: ReportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of the export-ledger command
#[derive(Args, Debug)]
pub struct ExportLedgerArgs {
    /// Roster file (JSON)
    pub roster: PathBuf,

    /// Output CSV file
    pub output: PathBuf,
}

fn create_file(path: &Path) -> LedgerResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn write_report<W: Write>(
    report: &PaymentReport,
    format: ReportFormat,
    symbol: &str,
    writer: &mut W,
) -> LedgerResult<()> {
    match format {
        ReportFormat::Table => write!(writer, "{}", format_report_table(report, symbol))
            .map_err(|e| LedgerError::Export(e.to_string())),
        ReportFormat::Csv => export_report_csv(report, writer),
        ReportFormat::Json => export_report_json(report, writer),
        ReportFormat::Yaml => export_report_yaml(report, writer),
    }
}

/// Handle the report command
pub fn handle_report_command(settings: &Settings, args: ReportArgs) -> LedgerResult<()> {
    let roster = RosterRepository::new(&args.roster).load()?;
    let fees = FeeSchedule::new(&settings.fees)?;
    let report = PaymentReport::from_roster(&roster, &fees);

    match args.output {
        Some(path) => {
            let mut writer = create_file(&path)?;
            write_report(&report, args.format, &settings.currency_symbol, &mut writer)?;
            writer
                .flush()
                .map_err(|e| LedgerError::Export(e.to_string()))?;
            println!("Report written to: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_report(&report, args.format, &settings.currency_symbol, &mut lock)?;
        }
    }

    Ok(())
}

/// Handle the export-ledger command
pub fn handle_export_ledger_command(args: ExportLedgerArgs) -> LedgerResult<()> {
    let roster = RosterRepository::new(&args.roster).load()?;

    let mut writer = create_file(&args.output)?;
    export_ledger_csv(&roster, &mut writer)?;
    writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;

    println!(
        "Exported {} children ({}) to: {}",
        roster.children.len(),
        roster.window,
        args.output.display()
    );
    Ok(())
}
