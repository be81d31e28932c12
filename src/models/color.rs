//! Canonical ledger cell colors
//!
//! Colors are stored as 8-digit ARGB hex strings ("FF92D050"). Six-digit RGB
//! input gets an opaque "FF" alpha prefix; a leading '#' is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized ARGB color code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorCode(String);

impl ColorCode {
    /// Grey: child not yet registered (no fee applies)
    pub const NOT_REGISTERED: &'static str = "FF595959";
    /// Red: nothing paid, also the first-unpaid month marker
    pub const NOTHING_PAID: &'static str = "FFFF0000";
    /// Green: fully paid month
    pub const FULLY_PAID: &'static str = "FF92D050";
    /// Yellow: the known 15€ transfer on a 25€ class
    pub const SPECIAL_UNDERPAY: &'static str = "FFFFFF00";
    /// Brown: known short transfers (10/15/20 instead of the fee)
    pub const KNOWN_AMOUNT: &'static str = "FFC65911";
    /// Amber: any other partial payment, and extras cells
    pub const PARTIAL: &'static str = "FFFFC000";
    /// Fully transparent fill: an empty cell
    pub const BLANK: &'static str = "00000000";

    /// Parse a color, accepting 6 or 8 hex digits with an optional '#'
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_start_matches('#').to_ascii_uppercase();
        if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match cleaned.len() {
            6 => Some(Self(format!("FF{}", cleaned))),
            8 => Some(Self(cleaned)),
            _ => None,
        }
    }

    /// Build from one of the associated constants
    pub fn known(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn not_registered() -> Self {
        Self::known(Self::NOT_REGISTERED)
    }

    pub fn nothing_paid() -> Self {
        Self::known(Self::NOTHING_PAID)
    }

    pub fn fully_paid() -> Self {
        Self::known(Self::FULLY_PAID)
    }

    pub fn partial() -> Self {
        Self::known(Self::PARTIAL)
    }

    /// The 8-digit ARGB representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 6-digit RGB part, as spreadsheet writers expect it
    pub fn rgb(&self) -> &str {
        &self.0[2..]
    }

    /// Whether this is a transparent/empty fill
    pub fn is_blank(&self) -> bool {
        self.0 == Self::BLANK
    }

    /// Whether this is the red unpaid color
    pub fn is_nothing_paid(&self) -> bool {
        self.0 == Self::NOTHING_PAID
    }

    /// Whether this is the grey not-registered color
    pub fn is_not_registered(&self) -> bool {
        self.0 == Self::NOT_REGISTERED
    }

    /// Whether this is the amber partial/extras color
    pub fn is_partial(&self) -> bool {
        self.0 == Self::PARTIAL
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ColorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid color code: '{}'", s))
    }
}

impl Serialize for ColorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ColorCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
