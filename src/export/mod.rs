//! Export module for the tuition ledger
//!
//! - CSV: payment report and ledger grid (spreadsheet-compatible)
//! - JSON: machine-readable payment report
//! - YAML: human-readable payment report

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_ledger_csv, export_report_csv};
pub use self::json::{export_report_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use self::yaml::export_report_yaml;
