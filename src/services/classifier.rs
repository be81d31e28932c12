//! Payment status classifier
//!
//! Turns a child's cumulative allocation into a status label and a ledger
//! color. The rule table is evaluated top to bottom and the first match wins:
//!
//! 1. fee <= 0: not yet registered
//! 2. nothing allocated: nothing paid
//! 3. at least one month covered: fully paid
//! 4. class A5 with exactly 15: the old G1/G2 sibling fee
//! 5. class A5 with 10, 15 or 20: known short transfer (tier A)
//! 6. class B0 with 10: known short transfer (tier B)
//! 7. anything else: partial payment with amount and months
//!
//! Colors are also decoded back into a [`StatusCategory`] so persisted
//! ledgers can be audited.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ClassId, ColorCode, Money};

/// Class whose short transfers are recognised at the tier A fee
const KNOWN_TIER_A_CLASS: &str = "A5";

/// Class whose short transfers are recognised at the tier B fee
const KNOWN_TIER_B_CLASS: &str = "B0";

const SPECIAL_UNDERPAY_AMOUNT: Money = Money::from_euros(15);
const KNOWN_TIER_A_AMOUNTS: [Money; 3] = [
    Money::from_euros(10),
    Money::from_euros(15),
    Money::from_euros(20),
];
const KNOWN_TIER_B_AMOUNTS: [Money; 1] = [Money::from_euros(10)];

/// Which known-amount rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownAmountTier {
    TierA,
    TierB,
}

/// Status of one child after allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentStatus {
    NotYetRegistered,
    NothingPaid,
    FullyPaid,
    SpecialUnderpay,
    KnownAmountUnderpay { tier: KnownAmountTier, allocated: Money },
    PartialPayment { allocated: Money, months_paid: f64 },
}

impl PaymentStatus {
    /// Label written next to the child in reports
    pub fn text(&self) -> String {
        match self {
            Self::NotYetRegistered => "Not yet registered".to_string(),
            Self::NothingPaid => "Nothing paid.".to_string(),
            Self::FullyPaid => "Fully paid.".to_string(),
            Self::SpecialUnderpay => "G1 and G2 paid €15 instead of €25.".to_string(),
            Self::KnownAmountUnderpay {
                tier: KnownAmountTier::TierA,
                allocated,
            } => format!("Transfers only €{} instead of €25.", allocated.format_cell()),
            Self::KnownAmountUnderpay {
                tier: KnownAmountTier::TierB,
                allocated,
            } => format!("Transfers only €{} instead of €15.", allocated.format_cell()),
            Self::PartialPayment {
                allocated,
                months_paid,
            } => format!("Partial payment: {} ({:.2} months)", allocated, months_paid),
        }
    }

    /// Canonical ledger color
    pub fn color(&self) -> ColorCode {
        ColorCode::known(self.category().color_code())
    }

    /// Category of this status, dropping the amounts
    pub fn category(&self) -> StatusCategory {
        match self {
            Self::NotYetRegistered => StatusCategory::NotYetRegistered,
            Self::NothingPaid => StatusCategory::NothingPaid,
            Self::FullyPaid => StatusCategory::FullyPaid,
            Self::SpecialUnderpay => StatusCategory::SpecialUnderpay,
            Self::KnownAmountUnderpay { .. } => StatusCategory::KnownAmountUnderpay,
            Self::PartialPayment { .. } => StatusCategory::PartialPayment,
        }
    }

    /// Whether at least one month is covered
    pub fn is_fully_paid(&self) -> bool {
        matches!(self, Self::FullyPaid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Status recovered from a ledger color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    NotYetRegistered,
    NothingPaid,
    FullyPaid,
    SpecialUnderpay,
    KnownAmountUnderpay,
    PartialPayment,
    Unknown,
}

impl StatusCategory {
    /// Every category that has a color, in rule order
    pub const COLORED: [StatusCategory; 6] = [
        Self::NotYetRegistered,
        Self::NothingPaid,
        Self::FullyPaid,
        Self::SpecialUnderpay,
        Self::KnownAmountUnderpay,
        Self::PartialPayment,
    ];

    fn color_code(&self) -> &'static str {
        match self {
            Self::NotYetRegistered => ColorCode::NOT_REGISTERED,
            Self::NothingPaid => ColorCode::NOTHING_PAID,
            Self::FullyPaid => ColorCode::FULLY_PAID,
            Self::SpecialUnderpay => ColorCode::SPECIAL_UNDERPAY,
            Self::KnownAmountUnderpay => ColorCode::KNOWN_AMOUNT,
            Self::PartialPayment => ColorCode::PARTIAL,
            Self::Unknown => ColorCode::BLANK,
        }
    }

    /// Canonical color, `None` for [`StatusCategory::Unknown`]
    pub fn color(&self) -> Option<ColorCode> {
        match self {
            Self::Unknown => None,
            other => Some(ColorCode::known(other.color_code())),
        }
    }

    /// Decode a persisted color
    pub fn from_color(color: &ColorCode) -> Self {
        Self::COLORED
            .into_iter()
            .find(|category| category.color_code() == color.as_str())
            .unwrap_or(Self::Unknown)
    }

    /// Decode a raw 6- or 8-digit color string
    pub fn from_color_str(raw: &str) -> Self {
        ColorCode::parse(raw)
            .map(|color| Self::from_color(&color))
            .unwrap_or(Self::Unknown)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotYetRegistered => "Not yet registered",
            Self::NothingPaid => "Nothing paid",
            Self::FullyPaid => "Fully paid",
            Self::SpecialUnderpay => "Special underpayment",
            Self::KnownAmountUnderpay => "Known short transfer",
            Self::PartialPayment => "Partial payment",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_class(class: &ClassId, code: &str) -> bool {
    class.as_str().trim().eq_ignore_ascii_case(code)
}

/// Classify a child's allocation
///
/// `months_paid` is the unrounded ratio of `allocated` to `monthly_fee`.
pub fn classify(
    months_paid: f64,
    monthly_fee: Money,
    allocated: Money,
    class: &ClassId,
) -> PaymentStatus {
    if !monthly_fee.is_positive() {
        return PaymentStatus::NotYetRegistered;
    }

    if allocated.is_zero() {
        return PaymentStatus::NothingPaid;
    }

    if months_paid >= 1.0 {
        return PaymentStatus::FullyPaid;
    }

    if is_class(class, KNOWN_TIER_A_CLASS) {
        if allocated == SPECIAL_UNDERPAY_AMOUNT {
            return PaymentStatus::SpecialUnderpay;
        }
        if KNOWN_TIER_A_AMOUNTS.contains(&allocated) {
            return PaymentStatus::KnownAmountUnderpay {
                tier: KnownAmountTier::TierA,
                allocated,
            };
        }
    } else if is_class(class, KNOWN_TIER_B_CLASS) && KNOWN_TIER_B_AMOUNTS.contains(&allocated) {
        return PaymentStatus::KnownAmountUnderpay {
            tier: KnownAmountTier::TierB,
            allocated,
        };
    }

    PaymentStatus::PartialPayment {
        allocated,
        months_paid,
    }
}
