//! YAML export
//!
//! Human-readable payment report with a comment header.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::export::json::ReportExport;
use crate::services::report::PaymentReport;

/// Export a payment report as YAML
pub fn export_report_yaml<W: Write>(report: &PaymentReport, writer: &mut W) -> LedgerResult<()> {
    let export = ReportExport::new(report);
    let err = |e: std::io::Error| LedgerError::Export(e.to_string());

    writeln!(writer, "# Tuition Payment Report").map_err(err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(err)?;
    if let Some(run_id) = &report.run_id {
        writeln!(writer, "# Run: {}", run_id).map_err(err)?;
    }
    writeln!(writer, "# App Version: {}", export.app_version).map_err(err)?;
    writeln!(writer, "#").map_err(err)?;
    writeln!(writer, "# Amounts are in cents.").map_err(err)?;
    writeln!(writer).map_err(err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(())
}
