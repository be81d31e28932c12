//! Money type for representing tuition amounts
//!
//! Internally stores amounts in cents (i64) so that pooled allocations conserve
//! every cent: splitting a parent's total across siblings never creates or
//! loses money, and rounding only happens when a ratio is presented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of a euro)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use tuition_ledger::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50€
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole euros
    ///
    /// # Examples
    /// ```
    /// use tuition_ledger::models::Money;
    /// assert_eq!(Money::from_euros(25).cents(), 2500);
    /// ```
    pub const fn from_euros(euros: i64) -> Self {
        Self(euros * 100)
    }

    /// Create a Money amount from euros and cents
    pub const fn from_euros_cents(euros: i64, cents: i64) -> Self {
        Self(euros * 100 + cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole euros portion (truncated toward zero)
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Clamp negative amounts to zero
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Self(0)
        } else {
            *self
        }
    }

    /// Number of whole `unit` amounts contained in this amount (floor division)
    ///
    /// Returns 0 when `unit` is not positive.
    pub const fn whole_units_of(&self, unit: Money) -> i64 {
        if unit.0 <= 0 {
            return 0;
        }
        self.0.div_euclid(unit.0)
    }

    /// What is left after removing every whole `unit` amount
    ///
    /// Returns zero when `unit` is not positive.
    pub const fn remainder_of(&self, unit: Money) -> Money {
        if unit.0 <= 0 {
            return Money(0);
        }
        Money(self.0.rem_euclid(unit.0))
    }

    /// Real-valued ratio of this amount to `unit` (0.0 when `unit` is not positive)
    pub fn ratio_to(&self, unit: Money) -> f64 {
        if unit.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 / unit.0 as f64
    }

    /// Amount as a floating point number of euros, for presentation only
    pub fn as_euros_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a money amount from a bank-statement string
    ///
    /// Accepts formats: "10.50", "-10.50", "10,50", "1.234,56", "1,234.56",
    /// "€10.50", "10.50 EUR", "10" (whole euros). Digits beyond the second
    /// decimal place are truncated.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let s = s.trim();

        let (negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = s.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, s)
        };

        let s = strip_currency(s);
        let normalized = normalize_separators(&s)
            .ok_or_else(|| MoneyParseError::InvalidFormat(original.to_string()))?;

        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        if !normalized.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }

        let cents = if let Some((whole, fraction)) = normalized.split_once('.') {
            let euros: i64 = if whole.is_empty() {
                0
            } else {
                whole.parse().map_err(|_| invalid())?
            };

            if !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }

            // Pad or truncate cents to 2 digits
            let cents: i64 = match fraction.len() {
                0 => 0,
                1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
                _ => fraction[..2].parse().map_err(|_| invalid())?,
            };

            euros
                .checked_mul(100)
                .and_then(|whole| whole.checked_add(cents))
                .ok_or_else(invalid)?
        } else {
            normalized
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or_else(invalid)?
        };

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Format with a trailing currency symbol ("10.50€")
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}.{:02}{}", self.euros().abs(), self.cents_part(), symbol)
        } else {
            format!("{}.{:02}{}", self.euros(), self.cents_part(), symbol)
        }
    }

    /// Format as a bare decimal ("10.50")
    pub fn format_plain(&self) -> String {
        if self.is_negative() {
            format!("-{}.{:02}", self.euros().abs(), self.cents_part())
        } else {
            format!("{}.{:02}", self.euros(), self.cents_part())
        }
    }

    /// Format the way ledger cells show amounts: whole euros without decimals
    pub fn format_cell(&self) -> String {
        if self.cents_part() == 0 {
            self.euros().to_string()
        } else {
            self.format_plain()
        }
    }
}

fn strip_currency(s: &str) -> String {
    let mut out = s.trim();
    for marker in ["€", "EUR", "eur", "Eur"] {
        out = out.strip_prefix(marker).unwrap_or(out).trim();
        out = out.strip_suffix(marker).unwrap_or(out).trim();
    }
    out.chars().filter(|c| !c.is_whitespace() && *c != '\'').collect()
}

/// Rewrite grouping and decimal separators so that only a single '.' remains
fn normalize_separators(s: &str) -> Option<String> {
    if s.is_empty() {
        return None;
    }

    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => s.to_string(),
        (_, 0) if dots == 1 => s.to_string(),
        (_, 0) => s.replace('.', ""),
        (0, 1) => {
            let decimals = s.rsplit(',').next().map(str::len).unwrap_or(0);
            if decimals == 3 {
                s.replace(',', "")
            } else {
                s.replace(',', ".")
            }
        }
        (0, _) => s.replace(',', ""),
        _ => {
            let last_dot = s.rfind('.')?;
            let last_comma = s.rfind(',')?;
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    };

    if normalized.matches('.').count() > 1 {
        return None;
    }
    Some(normalized)
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("€"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, factor: i64) -> Self {
        Self(self.0 * factor)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.euros(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "10.50€");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00€");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-10.50€");
        assert_eq!(format!("{}", Money::from_cents(5)), "0.05€");
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(Money::from_euros(25).format_cell(), "25");
        assert_eq!(Money::from_cents(750).format_cell(), "7.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((b * 3).cents(), 1500);
    }

    #[test]
    fn test_whole_units_and_remainder() {
        let total = Money::from_euros(45);
        let fee = Money::from_euros(40);
        assert_eq!(total.whole_units_of(fee), 1);
        assert_eq!(total.remainder_of(fee), Money::from_euros(5));

        assert_eq!(total.whole_units_of(Money::zero()), 0);
        assert_eq!(total.remainder_of(Money::zero()), Money::zero());
    }

    #[test]
    fn test_ratio() {
        let ratio = Money::from_euros(10).ratio_to(Money::from_euros(25));
        assert!((ratio - 0.4).abs() < 1e-9);
        assert_eq!(Money::from_euros(10).ratio_to(Money::zero()), 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("€10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.50 EUR").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
    }

    #[test]
    fn test_parse_european_separators() {
        assert_eq!(Money::parse("45,00").unwrap().cents(), 4500);
        assert_eq!(Money::parse("1.234,56").unwrap().cents(), 123456);
        assert_eq!(Money::parse("1,234.56").unwrap().cents(), 123456);
        assert_eq!(Money::parse("1,250").unwrap().cents(), 125000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("nan").is_err());
        assert!(Money::parse("1.2.3,4,5").is_err());
    }

    #[test]
    fn test_parse_rejects_amounts_beyond_range() {
        assert!(Money::parse("99999999999999999").is_err());
        assert!(Money::parse("99999999999999999,50").is_err());
        assert!(Money::parse("-99999999999999999.50").is_err());
        assert_eq!(
            Money::parse("92233720368547758.07"),
            Ok(Money::from_cents(i64::MAX))
        );
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_cents(-5).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(5).non_negative(), Money::from_cents(5));
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(100),
            Money::from_cents(200),
            Money::from_cents(300),
        ];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
