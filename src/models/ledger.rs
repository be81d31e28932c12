//! Ledger cells and prior ledger state
//!
//! A child's ledger row is a grid of month cells. Each cell may carry a
//! value (an amount or free text) and a fill color.

use serde::{Deserialize, Serialize};

use super::color::ColorCode;
use super::money::Money;
use super::month::MonthToken;

/// One month cell of a child's ledger row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCell {
    /// Cell content as written (usually an amount such as "25" or "7.50")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorCode>,
}

impl LedgerCell {
    /// A cell holding an amount with a fill color
    pub fn amount(amount: Money, color: ColorCode) -> Self {
        Self {
            value: Some(amount.format_cell()),
            color: Some(color),
        }
    }

    /// A colored cell without a value
    pub fn marker(color: ColorCode) -> Self {
        Self {
            value: None,
            color: Some(color),
        }
    }

    /// Trimmed text content, if any
    pub fn text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Whether the cell has neither text nor a visible fill
    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.color.as_ref().map_or(true, ColorCode::is_blank)
    }

    /// Numeric value of the cell, if its text is an amount
    pub fn amount_value(&self) -> Option<Money> {
        self.text().and_then(|text| Money::parse(text).ok())
    }
}

/// Where a child's ledger row currently ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorLedgerState {
    /// Last month with a recorded entry, `None` if the row is empty
    pub last_recorded_month: Option<MonthToken>,

    /// Fill color of that entry
    pub last_recorded_color: Option<ColorCode>,

    /// Text of that entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recorded_text: Option<String>,
}

impl PriorLedgerState {
    /// State of a row with no recorded entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the last entry marks the child as not yet registered
    pub fn is_not_registered(&self) -> bool {
        self.last_recorded_color
            .as_ref()
            .is_some_and(ColorCode::is_not_registered)
    }

    /// Whether the last entry is a partial (extras) month
    pub fn ends_with_partial(&self) -> bool {
        self.last_recorded_color
            .as_ref()
            .is_some_and(ColorCode::is_partial)
    }
}
