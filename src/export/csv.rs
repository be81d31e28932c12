//! CSV export
//!
//! Exports the payment report and the ledger grid in a spreadsheet-friendly
//! layout.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::services::classifier::StatusCategory;
use crate::services::report::PaymentReport;
use crate::storage::Roster;

fn export_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Export(e.to_string())
}

/// Export a payment report, one row per child
pub fn export_report_csv<W: Write>(report: &PaymentReport, writer: W) -> LedgerResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Child ID",
        "Name",
        "Parent",
        "Class",
        "Monthly Fee",
        "Allocated",
        "Months Paid",
        "Extras",
        "Status",
        "Category",
        "Color",
    ])
    .map_err(export_err)?;

    for row in &report.rows {
        csv.write_record([
            row.child_id.to_string(),
            row.name.clone(),
            row.parent.clone().unwrap_or_default(),
            row.class.to_string(),
            row.monthly_fee.format_plain(),
            row.allocated.format_plain(),
            format!("{:.2}", row.months_paid),
            row.extras.format_plain(),
            row.status.clone(),
            row.category.label().to_string(),
            row.color.to_string(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(export_err)?;
    Ok(())
}

/// Export the ledger grid
///
/// One row per child; every month of the roster's window gets a value
/// column and a status column decoded from the cell color.
pub fn export_ledger_csv<W: Write>(roster: &Roster, writer: W) -> LedgerResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let months: Vec<_> = roster.window.tokens().collect();

    let mut header = vec![
        "Child ID".to_string(),
        "Name".to_string(),
        "Class".to_string(),
        "Parent".to_string(),
        "Allocated".to_string(),
    ];
    for month in &months {
        header.push(month.label().to_string());
        header.push(format!("{} Status", month.label()));
    }
    csv.write_record(&header).map_err(export_err)?;

    for child in &roster.children {
        let mut record = vec![
            child.child_id.to_string(),
            child.name.clone(),
            child.class.to_string(),
            child.parent_name.clone().unwrap_or_default(),
            child.allocated.format_plain(),
        ];

        for month in &months {
            match child.cell(*month) {
                Some(cell) if !cell.is_empty() => {
                    record.push(cell.text().unwrap_or_default().to_string());
                    let category = cell
                        .color
                        .as_ref()
                        .map(StatusCategory::from_color)
                        .unwrap_or(StatusCategory::Unknown);
                    record.push(category.label().to_string());
                }
                _ => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }

        csv.write_record(&record).map_err(export_err)?;
    }

    csv.flush().map_err(export_err)?;
    Ok(())
}
