//! Month tokens and ledger windows
//!
//! The ledger runs over an academic window that starts in September. Month
//! tokens are ordered by position in the window, never by calendar
//! arithmetic: "9" < "12" < "1" < "8" < "9_next" < ... < "8_next".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Labels of the full two-year window, in order
pub const MONTH_LABELS: [&str; 24] = [
    "9", "10", "11", "12", "1", "2", "3", "4", "5", "6", "7", "8", "9_next", "10_next",
    "11_next", "12_next", "1_next", "2_next", "3_next", "4_next", "5_next", "6_next", "7_next",
    "8_next",
];

/// Number of months in a full two-year window
pub const FULL_WINDOW_LEN: usize = MONTH_LABELS.len();

/// One month position in the ledger window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthToken(usize);

impl MonthToken {
    /// Token at a window position, if the position exists
    pub fn at(index: usize) -> Option<Self> {
        (index < FULL_WINDOW_LEN).then_some(Self(index))
    }

    /// Position in the window (0 = first September)
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Label as written in ledger headers ("9", "1_next", ...)
    pub fn label(&self) -> &'static str {
        MONTH_LABELS[self.0]
    }

    /// Calendar month number (1-12)
    pub fn calendar_month(&self) -> u32 {
        ((self.0 + 8) % 12) as u32 + 1
    }

    /// Whether the token belongs to the second academic year
    pub const fn is_next_year(&self) -> bool {
        self.0 >= 12
    }

    /// The following token, if any
    pub fn next(&self) -> Option<Self> {
        Self::at(self.0 + 1)
    }

    /// Iterate over every token of the full window
    pub fn all() -> impl Iterator<Item = MonthToken> {
        (0..FULL_WINDOW_LEN).map(MonthToken)
    }
}

impl fmt::Display for MonthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MonthToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MONTH_LABELS
            .iter()
            .position(|label| *label == s)
            .map(MonthToken)
            .ok_or_else(|| format!("Unknown month token: '{}'", s))
    }
}

impl Serialize for MonthToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for MonthToken {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Width of the month grid carried by a roster
///
/// Older rosters only carry 17 months (September through the following
/// January); current ones carry the full two academic years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LedgerWindow {
    OneAndHalfYear,
    #[default]
    TwoYear,
}

impl LedgerWindow {
    /// Number of month columns in this window
    pub const fn len(&self) -> usize {
        match self {
            Self::OneAndHalfYear => 17,
            Self::TwoYear => FULL_WINDOW_LEN,
        }
    }

    /// Windows are never empty; provided for API symmetry with `len`
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Tokens of this window, in order
    pub fn tokens(&self) -> impl Iterator<Item = MonthToken> {
        MonthToken::all().take(self.len())
    }

    /// Window matching a number of month columns
    pub fn from_month_count(count: usize) -> Option<Self> {
        match count {
            17 => Some(Self::OneAndHalfYear),
            FULL_WINDOW_LEN => Some(Self::TwoYear),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneAndHalfYear => write!(f, "1.5 years ({} months)", self.len()),
            Self::TwoYear => write!(f, "2 years ({} months)", self.len()),
        }
    }
}
