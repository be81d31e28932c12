//! Fee schedule service
//!
//! Maps a class code to its monthly fee. Classes belong to one of two fee
//! tiers; a class listed in neither falls back to the tier A fee, and a class
//! listed in both is resolved by the configured overlap policy.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::warn;

use crate::config::settings::{FeeScheduleSettings, OverlapResolution};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{ClassId, Money};

/// The two fee bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeTier {
    A,
    B,
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "tier A"),
            Self::B => write!(f, "tier B"),
        }
    }
}

/// How a class was resolved to a fee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSource {
    /// Listed in exactly one tier
    Tier(FeeTier),
    /// Listed in both tiers, resolved by policy
    Overlap(FeeTier),
    /// Listed in neither tier, tier A fallback
    Fallback,
    /// Fee injected directly for the class
    Override,
}

/// Resolved fee for a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeLookup {
    pub fee: Money,
    pub source: FeeSource,
}

/// Class-to-fee table
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    tier_a_fee: Money,
    tier_b_fee: Money,
    tier_a: BTreeSet<String>,
    tier_b: BTreeSet<String>,
    overlap: OverlapResolution,
    overrides: HashMap<String, Money>,
}

fn class_key(class: &str) -> String {
    class.trim().to_ascii_uppercase()
}

impl FeeSchedule {
    /// Build the schedule from settings
    pub fn new(settings: &FeeScheduleSettings) -> LedgerResult<Self> {
        if settings.tier_a_fee.is_negative() || settings.tier_b_fee.is_negative() {
            return Err(LedgerError::Config(
                "Monthly fees cannot be negative".into(),
            ));
        }

        let schedule = Self::from_settings_unchecked(settings);

        for class in schedule.overlapping_classes() {
            warn!(
                class = %class,
                resolved_to = %schedule.overlap_tier(),
                "Class is listed in both fee tiers"
            );
        }

        Ok(schedule)
    }

    fn from_settings_unchecked(settings: &FeeScheduleSettings) -> Self {
        Self {
            tier_a_fee: settings.tier_a_fee,
            tier_b_fee: settings.tier_b_fee,
            tier_a: settings.tier_a_classes.iter().map(|c| class_key(c)).collect(),
            tier_b: settings.tier_b_classes.iter().map(|c| class_key(c)).collect(),
            overlap: settings.overlap,
            overrides: HashMap::new(),
        }
    }

    /// Pin a class to a fixed fee, bypassing the tier tables
    pub fn with_override(mut self, class: &str, fee: Money) -> Self {
        self.overrides.insert(class_key(class), fee);
        self
    }

    /// Fee of the higher tier, used for unknown classes
    pub fn tier_a_fee(&self) -> Money {
        self.tier_a_fee
    }

    /// Fee of the lower tier
    pub fn tier_b_fee(&self) -> Money {
        self.tier_b_fee
    }

    /// Fee for a tier
    pub fn tier_fee(&self, tier: FeeTier) -> Money {
        match tier {
            FeeTier::A => self.tier_a_fee,
            FeeTier::B => self.tier_b_fee,
        }
    }

    fn overlap_tier(&self) -> FeeTier {
        match self.overlap {
            OverlapResolution::PreferTierA => FeeTier::A,
            OverlapResolution::PreferTierB => FeeTier::B,
        }
    }

    /// Classes listed in both tiers, sorted
    pub fn overlapping_classes(&self) -> Vec<String> {
        self.tier_a.intersection(&self.tier_b).cloned().collect()
    }

    /// Tier membership of a class, `None` if it is listed in neither
    pub fn tier_of(&self, class: &ClassId) -> Option<FeeTier> {
        let key = class_key(class.as_str());
        match (self.tier_a.contains(&key), self.tier_b.contains(&key)) {
            (true, true) => Some(self.overlap_tier()),
            (true, false) => Some(FeeTier::A),
            (false, true) => Some(FeeTier::B),
            (false, false) => None,
        }
    }

    /// Resolve a class to its fee and say how it was resolved
    pub fn lookup(&self, class: &ClassId) -> FeeLookup {
        let key = class_key(class.as_str());

        if let Some(fee) = self.overrides.get(&key) {
            return FeeLookup {
                fee: *fee,
                source: FeeSource::Override,
            };
        }

        match (self.tier_a.contains(&key), self.tier_b.contains(&key)) {
            (true, true) => {
                let tier = self.overlap_tier();
                FeeLookup {
                    fee: self.tier_fee(tier),
                    source: FeeSource::Overlap(tier),
                }
            }
            (true, false) => FeeLookup {
                fee: self.tier_a_fee,
                source: FeeSource::Tier(FeeTier::A),
            },
            (false, true) => FeeLookup {
                fee: self.tier_b_fee,
                source: FeeSource::Tier(FeeTier::B),
            },
            (false, false) => FeeLookup {
                fee: self.tier_a_fee,
                source: FeeSource::Fallback,
            },
        }
    }

    /// Monthly fee for a class
    ///
    /// Never fails: an unknown class is billed at the tier A fee.
    pub fn monthly_fee(&self, class: &ClassId) -> Money {
        let lookup = self.lookup(class);
        if lookup.source == FeeSource::Fallback {
            warn!(class = %class, fee = %lookup.fee, "Unknown class, using tier A fee");
        }
        lookup.fee
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::from_settings_unchecked(&FeeScheduleSettings::default())
    }
}
