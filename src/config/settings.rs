//! User settings for the tuition ledger
//!
//! Holds the fee schedule, the policies that resolve the open questions of
//! payment aggregation and prior-total sourcing, the run mode and logging
//! preferences. Every field has a default so a partial `config.json` loads.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::Money;
use crate::services::payments::PaymentAggregation;
use crate::services::prior::PriorSource;

/// How a class listed in both fee tiers is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapResolution {
    /// The higher tier wins (what the fee lookup has always done)
    #[default]
    PreferTierA,
    /// The lower tier wins
    PreferTierB,
}

/// Fee schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeScheduleSettings {
    /// Monthly fee for tier A classes (primary school, college)
    #[serde(default = "default_tier_a_fee")]
    pub tier_a_fee: Money,

    /// Monthly fee for tier B classes (pre-school, Sunday school)
    #[serde(default = "default_tier_b_fee")]
    pub tier_b_fee: Money,

    /// Class codes billed at the tier A fee
    #[serde(default = "default_tier_a_classes")]
    pub tier_a_classes: Vec<String>,

    /// Class codes billed at the tier B fee
    #[serde(default = "default_tier_b_classes")]
    pub tier_b_classes: Vec<String>,

    /// Which tier wins for a class listed in both
    #[serde(default)]
    pub overlap: OverlapResolution,
}

fn default_tier_a_fee() -> Money {
    Money::from_euros(25)
}

fn default_tier_b_fee() -> Money {
    Money::from_euros(15)
}

fn default_tier_a_classes() -> Vec<String> {
    ["A5", "A6", "A7", "A8", "A9", "A10", "A11", "A12", "G2"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_tier_b_classes() -> Vec<String> {
    ["B0", "B1", "B2", "B3", "G1", "G2"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for FeeScheduleSettings {
    fn default() -> Self {
        Self {
            tier_a_fee: default_tier_a_fee(),
            tier_b_fee: default_tier_b_fee(),
            tier_a_classes: default_tier_a_classes(),
            tier_b_classes: default_tier_b_classes(),
            overlap: OverlapResolution::default(),
        }
    }
}

/// Whether a run processes the whole roster or a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// All children up to the first row without an id
    #[default]
    Production,
    /// The first `test_row_limit` children only
    Test,
}

/// User settings for the tuition ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Fee tiers and class membership
    #[serde(default)]
    pub fees: FeeScheduleSettings,

    /// How several transfers from one parent combine into a run's payment
    #[serde(default)]
    pub payment_aggregation: PaymentAggregation,

    /// Where the prior allocated total comes from
    #[serde(default)]
    pub prior_source: PriorSource,

    /// Default run mode
    #[serde(default)]
    pub run_mode: RunMode,

    /// Number of children processed in test mode
    #[serde(default = "default_test_row_limit")]
    pub test_row_limit: usize,

    /// Currency symbol appended to amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_test_row_limit() -> usize {
    100
}

fn default_currency() -> String {
    "€".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            fees: FeeScheduleSettings::default(),
            payment_aggregation: PaymentAggregation::default(),
            prior_source: PriorSource::default(),
            run_mode: RunMode::default(),
            test_row_limit: default_test_row_limit(),
            currency_symbol: default_currency(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would make every run meaningless
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.fees.tier_a_fee.is_negative() || self.fees.tier_b_fee.is_negative() {
            return Err(LedgerError::Config(
                "Monthly fees cannot be negative".into(),
            ));
        }

        if self.test_row_limit == 0 {
            return Err(LedgerError::Config(
                "test_row_limit must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.fees.tier_a_fee, Money::from_euros(25));
        assert_eq!(settings.fees.tier_b_fee, Money::from_euros(15));
        assert_eq!(settings.run_mode, RunMode::Production);
        assert_eq!(settings.test_row_limit, 100);
        assert_eq!(settings.payment_aggregation, PaymentAggregation::Sum);
        assert_eq!(settings.prior_source, PriorSource::RecordedAllocation);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.fees.overlap = OverlapResolution::PreferTierB;
        settings.run_mode = RunMode::Test;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.fees.overlap, OverlapResolution::PreferTierB);
        assert_eq!(loaded.run_mode, RunMode::Test);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"test_row_limit": 5}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.test_row_limit, 5);
        assert_eq!(loaded.fees.tier_a_classes.len(), 9);
    }

    #[test]
    fn test_negative_fee_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"fees": {"tier_a_fee": -100}}"#).unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
