//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod lookup;
pub mod report;
pub mod run;

pub use lookup::{handle_audit_command, handle_fee_command, handle_status_command};
pub use report::{
    handle_export_ledger_command, handle_report_command, ExportLedgerArgs, ReportArgs,
    ReportFormat,
};
pub use run::{handle_run_command, RunArgs};
