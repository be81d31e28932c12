//! Payment records
//!
//! One bank transfer from a payer. Amounts that are missing, non-numeric,
//! zero or negative are coerced to zero: a parent with an unreadable
//! transfer simply paid nothing new this run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::ids::ImportId;
use super::money::Money;

/// Why a raw amount was coerced to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountIssue {
    /// Empty or not a number
    Unparsable,
    /// Zero, or an outgoing (negative) transfer
    NonPositive,
}

impl fmt::Display for AmountIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsable => write!(f, "not a number"),
            Self::NonPositive => write!(f, "not a positive amount"),
        }
    }
}

/// Coerce a raw statement amount into a non-negative Money value
///
/// Never fails: the second element explains a coercion to zero.
pub fn coerce_amount(raw: &str) -> (Money, Option<AmountIssue>) {
    match Money::parse(raw) {
        Ok(amount) if amount.is_positive() => (amount, None),
        Ok(_) => (Money::zero(), Some(AmountIssue::NonPositive)),
        Err(_) => (Money::zero(), Some(AmountIssue::Unparsable)),
    }
}

/// Separates the fields fed into the import id digest
const FIELD_SEPARATOR: u8 = 0x1f;

/// A single bank transaction as read from a statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payer as printed on the statement, before normalization
    pub payer_name: String,

    /// Amount credited (never negative after coercion)
    pub amount: Money,

    /// Booking date, when the statement carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date: Option<NaiveDate>,

    /// Row in the statement (0-indexed, excluding header)
    pub row_number: usize,

    /// Deterministic id used to avoid applying the same transfer twice
    pub import_id: ImportId,
}

impl PaymentRecord {
    /// Create a record, deriving its import id
    pub fn new(
        payer_name: impl Into<String>,
        amount: Money,
        booking_date: Option<NaiveDate>,
        row_number: usize,
    ) -> Self {
        let payer_name = payer_name.into();
        let import_id = Self::generate_import_id(row_number, booking_date, &payer_name, amount);
        Self {
            payer_name,
            amount: amount.non_negative(),
            booking_date,
            row_number,
            import_id,
        }
    }

    /// Generate an import ID from the transaction data
    ///
    /// Ids are stored in the roster and compared across runs, so the digest
    /// must not depend on the build.
    pub fn generate_import_id(
        row_number: usize,
        booking_date: Option<NaiveDate>,
        payer_name: &str,
        amount: Money,
    ) -> ImportId {
        let date = booking_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(row_number.to_string().as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(date.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(payer_name.trim().as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(amount.cents().to_string().as_bytes());

        let digest = format!("{:x}", hasher.finalize());
        ImportId::new(format!("imp-{}", &digest[..16]))
    }
}
