//! Run CLI command
//!
//! Loads a roster and a bank statement, allocates the new payments and
//! writes the updated roster and the audit trail. Nothing is written unless
//! the whole run succeeds. The roster is saved first; a failing audit write
//! after that is reported but does not fail the command.

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::LedgerPaths;
use crate::config::settings::{RunMode, Settings};
use crate::display::report::{format_report_table, format_run_summary};
use crate::error::LedgerResult;
use crate::services::{FeeSchedule, ImportService, PaymentReport, RunService};
use crate::storage::RosterRepository;

/// Arguments of the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Roster file (JSON)
    pub roster: PathBuf,

    /// Bank statement (CSV)
    pub statement: PathBuf,

    /// Write the updated roster here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Process only the first children of the roster
    #[arg(long)]
    pub test: bool,

    /// Number of children processed in test mode
    #[arg(long, requires = "test")]
    pub limit: Option<usize>,

    /// Show the allocation without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the run command
pub fn handle_run_command(paths: &LedgerPaths, settings: &Settings, args: RunArgs) -> LedgerResult<()> {
    let repository = RosterRepository::new(&args.roster);
    let roster = repository.load()?;

    let import = ImportService::new().parse_file(&args.statement)?;
    for issue in &import.issues {
        println!("Row {}: {}", issue.row_number, issue.message);
    }

    let mut settings = settings.clone();
    if let Some(limit) = args.limit {
        settings.test_row_limit = limit.max(1);
    }
    let mode = if args.test {
        RunMode::Test
    } else {
        settings.run_mode
    };

    let fees = FeeSchedule::new(&settings.fees)?;
    let outcome = RunService::new(&settings, &fees).execute(&roster, &import.records, mode)?;

    println!("{}", format_run_summary(&outcome.report, args.dry_run));
    let report = PaymentReport::from_run(&outcome.report);
    print!("{}", format_report_table(&report, &settings.currency_symbol));

    if args.dry_run {
        println!();
        println!("Dry run: nothing written.");
        return Ok(());
    }

    let target = args.output.unwrap_or(args.roster);
    RosterRepository::new(&target).save(&outcome.roster)?;

    info!(run = %outcome.report.run_id, path = %target.display(), "Roster saved");
    println!();
    println!("Roster written to: {}", target.display());

    let entries = AuditEntry::for_run(&outcome.report);
    if let Err(e) = AuditLogger::new(paths.audit_log()).log_batch(&entries) {
        warn!(run = %outcome.report.run_id, error = %e, "Audit log not written");
        println!("Warning: audit log not written: {}", e);
    }

    Ok(())
}
