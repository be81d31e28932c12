//! Lookup and audit formatting
//!
//! Small views used by the `fee`, `status` and `audit` commands.

use crate::audit::AuditEntry;
use crate::models::ClassId;
use crate::services::classifier::StatusCategory;
use crate::services::fees::{FeeLookup, FeeSource};

/// Format a fee lookup for a class
pub fn format_fee_lookup(class: &ClassId, lookup: &FeeLookup) -> String {
    let source = match lookup.source {
        FeeSource::Tier(tier) => tier.to_string(),
        FeeSource::Overlap(tier) => format!("{}, listed in both tiers", tier),
        FeeSource::Fallback => "unknown class, tier A fallback".to_string(),
        FeeSource::Override => "override".to_string(),
    };
    format!("{}: {} per month ({})", class, lookup.fee, source)
}

/// Format a decoded ledger color
pub fn format_status_lookup(raw: &str, category: StatusCategory) -> String {
    match category.color() {
        Some(color) => format!("{} -> {} ({})", raw, category, color),
        None => format!("{} -> {}", raw, category),
    }
}

/// Format audit entries, oldest first
pub fn format_audit_entries(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No audit entries found.".to_string();
    }

    entries
        .iter()
        .map(AuditEntry::format_human_readable)
        .collect::<Vec<_>>()
        .join("\n")
}
