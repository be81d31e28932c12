//! Lookup CLI commands: fee, status and audit

use crate::audit::AuditLogger;
use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::display::ledger::{format_audit_entries, format_fee_lookup, format_status_lookup};
use crate::error::LedgerResult;
use crate::models::ClassId;
use crate::services::{FeeSchedule, StatusCategory};

/// Handle the fee command
pub fn handle_fee_command(settings: &Settings, class: &str) -> LedgerResult<()> {
    let fees = FeeSchedule::new(&settings.fees)?;
    let class = ClassId::new(class);
    println!("{}", format_fee_lookup(&class, &fees.lookup(&class)));
    Ok(())
}

/// Handle the status command
pub fn handle_status_command(color: &str) -> LedgerResult<()> {
    let category = StatusCategory::from_color_str(color);
    println!("{}", format_status_lookup(color, category));
    Ok(())
}

/// Handle the audit command
pub fn handle_audit_command(paths: &LedgerPaths, limit: usize) -> LedgerResult<()> {
    let entries = AuditLogger::new(paths.audit_log()).read_recent(limit)?;
    println!("{}", format_audit_entries(&entries));
    Ok(())
}
