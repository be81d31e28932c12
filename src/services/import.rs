//! Bank statement import
//!
//! Parses a bank statement CSV into payment records. The default layout is
//! the bank export the school receives (account, booking date, value date,
//! transaction text, purpose, payer, IBAN, BIC, amount, currency, info). A
//! header row, when present, is used to find the payer, amount and date
//! columns by name. Bad amounts never fail the import: they become zero and
//! are reported per row.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{coerce_amount, AmountIssue, PaymentRecord};

/// Two-digit years come first: `%Y` would read "25" as the year 25
const DATE_FORMATS: [&str; 5] = ["%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

/// Column mapping configuration for statement import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Index of the payer name column
    pub payer_column: usize,
    /// Index of the amount column
    pub amount_column: usize,
    /// Index of the booking date column
    pub date_column: Option<usize>,
    /// Whether the first row is a header
    pub has_header: bool,
    /// Delimiter byte
    pub delimiter: u8,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::bank_export()
    }
}

impl ColumnMapping {
    /// The bank's eleven-column export
    pub fn bank_export() -> Self {
        Self {
            payer_column: 5,
            amount_column: 8,
            date_column: Some(1),
            has_header: true,
            delimiter: b',',
        }
    }

    /// Two-column `payer,amount` list
    pub fn simple() -> Self {
        Self {
            payer_column: 0,
            amount_column: 1,
            date_column: None,
            has_header: true,
            delimiter: b',',
        }
    }

    /// Set whether first row is header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Detect column mapping from a first row
    ///
    /// Returns `None` when the row does not look like a header.
    pub fn detect_from_headers(headers: &StringRecord) -> Option<Self> {
        let mut payer = None;
        let mut amount = None;
        let mut date = None;

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();

            if amount.is_none() && (h.contains("amount") || h.contains("betrag")) {
                amount = Some(idx);
            } else if date.is_none()
                && (h.contains("booking") || h.contains("buchungstag") || h == "date")
            {
                date = Some(idx);
            } else if payer.is_none()
                && (h.contains("payer")
                    || h.contains("parent")
                    || h.contains("zahlungspflichtiger")
                    || h.contains("auftraggeber")
                    || h == "name")
            {
                payer = Some(idx);
            }
        }

        Some(Self {
            payer_column: payer?,
            amount_column: amount?,
            date_column: date,
            has_header: true,
            delimiter: b',',
        })
    }
}

/// A row that imported with a problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    /// 1-based data row number
    pub row_number: usize,
    pub message: String,
}

/// Result of parsing a statement
#[derive(Debug, Clone, Default)]
pub struct StatementImport {
    pub records: Vec<PaymentRecord>,
    pub issues: Vec<RowIssue>,
    /// Rows without a payer name
    pub skipped: usize,
}

/// Service for statement import
pub struct ImportService {
    mapping: Option<ColumnMapping>,
}

impl ImportService {
    /// Detect the layout from the statement itself
    pub fn new() -> Self {
        Self { mapping: None }
    }

    /// Use a fixed column mapping
    pub fn with_mapping(mapping: ColumnMapping) -> Self {
        Self {
            mapping: Some(mapping),
        }
    }

    /// Parse a statement file
    pub fn parse_file(&self, path: &std::path::Path) -> LedgerResult<StatementImport> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Import(format!("Failed to read statement {}: {}", path.display(), e))
        })?;
        let import = self.parse_str(&contents)?;
        info!(
            path = %path.display(),
            records = import.records.len(),
            issues = import.issues.len(),
            "Statement parsed"
        );
        Ok(import)
    }

    /// Parse statement text, detecting a `;` delimiter when no mapping is set
    pub fn parse_str(&self, contents: &str) -> LedgerResult<StatementImport> {
        let delimiter = match &self.mapping {
            Some(mapping) => mapping.delimiter,
            None => sniff_delimiter(contents),
        };
        self.parse_reader(contents.as_bytes(), delimiter)
    }

    /// Parse a statement from a reader
    pub fn parse_reader<R: Read>(&self, reader: R, delimiter: u8) -> LedgerResult<StatementImport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut rows = reader.records();
        let mut import = StatementImport::default();

        let first = match rows.next() {
            Some(record) => record?,
            None => return Ok(import),
        };

        let (mapping, pending_first) = match &self.mapping {
            Some(mapping) if mapping.has_header => (mapping.clone(), None),
            Some(mapping) => (mapping.clone(), Some(first)),
            None => match ColumnMapping::detect_from_headers(&first) {
                Some(mapping) => (mapping, None),
                None if looks_like_data_row(&first, &ColumnMapping::bank_export()) => {
                    (ColumnMapping::bank_export().with_header(false), Some(first))
                }
                None => (ColumnMapping::bank_export(), None),
            },
        };

        let mut row_number = 0;
        for result in pending_first.into_iter().map(Ok).chain(rows) {
            row_number += 1;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    import.issues.push(RowIssue {
                        row_number,
                        message: format!("Error reading CSV record: {}", e),
                    });
                    continue;
                }
            };
            parse_record(&record, row_number, &mapping, &mut import);
        }

        Ok(import)
    }
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_record(
    record: &StringRecord,
    row_number: usize,
    mapping: &ColumnMapping,
    import: &mut StatementImport,
) {
    let payer = record
        .get(mapping.payer_column)
        .map(str::trim)
        .unwrap_or_default();

    if payer.is_empty() {
        import.skipped += 1;
        return;
    }

    let raw_amount = record
        .get(mapping.amount_column)
        .map(str::trim)
        .unwrap_or_default();
    let (amount, issue) = coerce_amount(raw_amount);

    if let Some(issue) = issue {
        warn!(row = row_number, payer, amount = raw_amount, %issue, "Amount coerced to zero");
        let message = match issue {
            AmountIssue::Unparsable => format!("Amount '{}' is not a number", raw_amount),
            AmountIssue::NonPositive => format!("Amount '{}' is not positive", raw_amount),
        };
        import.issues.push(RowIssue {
            row_number,
            message,
        });
    }

    let date = mapping
        .date_column
        .and_then(|col| record.get(col))
        .and_then(parse_date);

    import
        .records
        .push(PaymentRecord::new(payer, amount, date, row_number));
}

/// Parse a date trying the formats banks commonly use
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Whether a first row already holds data rather than headers
fn looks_like_data_row(record: &StringRecord, mapping: &ColumnMapping) -> bool {
    let date_ok = mapping
        .date_column
        .and_then(|col| record.get(col))
        .and_then(parse_date)
        .is_some();
    let amount_ok = record
        .get(mapping.amount_column)
        .map(|raw| coerce_amount(raw).1 != Some(AmountIssue::Unparsable))
        .unwrap_or(false);
    date_ok || amount_ok
}

fn sniff_delimiter(contents: &str) -> u8 {
    let first_line = contents.lines().next().unwrap_or_default();
    if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    const BANK_HEADER: &str = "Auftragskonto,Buchungstag,Valutadatum,Buchungstext,Verwendungszweck,Beguenstigter/Zahlungspflichtiger,Kontonummer/IBAN,BIC (SWIFT-Code),Betrag,Waehrung,Info";

    #[test]
    fn test_parse_bank_export_with_header() {
        let csv_data = format!(
            "{}\nDE01,03.09.25,03.09.25,GUTSCHRIFT,Schulgeld,Karim Haddad,DE02,BIC1,45.00,EUR,Umsatz gebucht\n",
            BANK_HEADER
        );
        let import = ImportService::new().parse_str(&csv_data).unwrap();

        assert_eq!(import.records.len(), 1);
        let record = &import.records[0];
        assert_eq!(record.payer_name, "Karim Haddad");
        assert_eq!(record.amount, Money::from_euros(45));
        assert_eq!(record.booking_date, NaiveDate::from_ymd_opt(2025, 9, 3));
        assert_eq!(record.row_number, 1);
        assert!(import.issues.is_empty());
    }

    #[test]
    fn test_parse_semicolon_export_with_decimal_comma() {
        let csv_data = format!(
            "{}\nDE01;03.09.2025;03.09.2025;GUTSCHRIFT;Schulgeld;Nadia Benali;DE02;BIC1;\"1.234,50\";EUR;\n",
            BANK_HEADER.replace(',', ";")
        );
        let import = ImportService::new().parse_str(&csv_data).unwrap();

        assert_eq!(import.records[0].amount, Money::from_cents(123_450));
        assert_eq!(import.records[0].payer_name, "Nadia Benali");
    }

    #[test]
    fn test_headerless_bank_export() {
        let csv_data = "DE01,03.09.25,03.09.25,GUTSCHRIFT,Schulgeld,Karim Haddad,DE02,BIC1,25,EUR,\n";
        let import = ImportService::new().parse_str(csv_data).unwrap();
        assert_eq!(import.records.len(), 1);
        assert_eq!(import.records[0].amount, Money::from_euros(25));
    }

    #[test]
    fn test_bad_amounts_become_zero() {
        let csv_data = "payer,amount\nKarim Haddad,n/a\nNadia Benali,-15\nSara Amrani,20\n";
        let import = ImportService::new().parse_str(csv_data).unwrap();

        assert_eq!(import.records.len(), 3);
        assert_eq!(import.records[0].amount, Money::zero());
        assert_eq!(import.records[1].amount, Money::zero());
        assert_eq!(import.records[2].amount, Money::from_euros(20));
        assert_eq!(import.issues.len(), 2);
        assert_eq!(import.issues[0].row_number, 1);
    }

    #[test]
    fn test_rows_without_payer_are_skipped() {
        let csv_data = "payer,amount\n,25\nKarim Haddad,25\n";
        let import = ImportService::new().parse_str(csv_data).unwrap();
        assert_eq!(import.skipped, 1);
        assert_eq!(import.records.len(), 1);
    }

    #[test]
    fn test_fixed_mapping() {
        let csv_data = "Karim Haddad,25\nNadia Benali,15\n";
        let service = ImportService::with_mapping(ColumnMapping::simple().with_header(false));
        let import = service.parse_str(csv_data).unwrap();
        assert_eq!(import.records.len(), 2);
    }

    #[test]
    fn test_detect_mapping() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(BANK_HEADER.as_bytes());
        let headers = reader.records().next().unwrap().unwrap();
        let mapping = ColumnMapping::detect_from_headers(&headers).unwrap();

        assert_eq!(mapping, ColumnMapping::bank_export());
    }

    #[test]
    fn test_import_ids_differ_per_row() {
        let csv_data = "payer,amount\nKarim Haddad,25\nKarim Haddad,25\n";
        let import = ImportService::new().parse_str(csv_data).unwrap();
        assert_ne!(import.records[0].import_id, import.records[1].import_id);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("03.09.2025"), NaiveDate::from_ymd_opt(2025, 9, 3));
        assert_eq!(parse_date("2025-09-03"), NaiveDate::from_ymd_opt(2025, 9, 3));
        assert_eq!(parse_date("not a date"), None);
    }
}
