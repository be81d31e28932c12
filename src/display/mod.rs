//! Display formatting for terminal output
//!
//! Formats reports, run summaries and lookups as plain text tables.

pub mod ledger;
pub mod report;

pub use ledger::{format_audit_entries, format_fee_lookup, format_status_lookup};
pub use report::{format_report_table, format_run_summary};
