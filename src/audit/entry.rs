//! Audit entry data structures
//!
//! Every run writes one summary entry and one entry per child whose
//! allocation, status or ledger cells changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::change_summary;
use crate::models::{Money, RunId};
use crate::services::classifier::StatusCategory;
use crate::services::run::{ChildChange, RunReport};

/// What an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Summary of a whole run
    Run,
    /// Change to one child's allocation
    Allocation,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Run => write!(f, "RUN"),
            EntryKind::Allocation => write!(f, "ALLOCATION"),
        }
    }
}

/// Allocation state of a child at one point of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSnapshot {
    pub allocated: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusCategory>,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the run started (UTC)
    pub timestamp: DateTime<Utc>,

    pub run_id: RunId,

    pub kind: EntryKind,

    /// Child id for allocation entries, run mode for run entries
    pub subject: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<AllocationSnapshot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<AllocationSnapshot>,

    /// Human-readable summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Entry summarizing a run
    pub fn run(report: &RunReport) -> Self {
        let summary = format!(
            "{} children processed, {} changed, {} applied from {} records, {} duplicates, {} unmatched",
            report.processed,
            report.changes.len(),
            report.payments.total,
            report.payments.records,
            report.payments.duplicates,
            report.payments.unmatched.len(),
        );

        Self {
            timestamp: report.started_at,
            run_id: report.run_id,
            kind: EntryKind::Run,
            subject: format!("{:?}", report.mode).to_lowercase(),
            subject_name: None,
            before: None,
            after: None,
            diff_summary: Some(summary),
        }
    }

    /// Entry for one child's change
    pub fn allocation(run_id: RunId, timestamp: DateTime<Utc>, change: &ChildChange) -> Self {
        Self {
            timestamp,
            run_id,
            kind: EntryKind::Allocation,
            subject: change.child_id.to_string(),
            subject_name: Some(change.name.clone()),
            before: Some(AllocationSnapshot {
                allocated: change.allocated_before,
                status: change.status_before,
            }),
            after: Some(AllocationSnapshot {
                allocated: change.allocated_after,
                status: Some(change.status_after),
            }),
            diff_summary: change_summary(change),
        }
    }

    /// Every entry a run produces, summary first
    pub fn for_run(report: &RunReport) -> Vec<Self> {
        std::iter::once(Self::run(report))
            .chain(
                report
                    .changes
                    .iter()
                    .map(|change| Self::allocation(report.run_id, report.started_at, change)),
            )
            .collect()
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.run_id,
            self.kind,
            self.subject
        );

        if let Some(name) = &self.subject_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChildId;

    fn change() -> ChildChange {
        ChildChange {
            child_id: ChildId::new("12"),
            name: "Haddad Lina".into(),
            allocated_before: Money::zero(),
            allocated_after: Money::from_euros(30),
            status_before: None,
            status_after: StatusCategory::FullyPaid,
            status_text: "Fully paid".into(),
            cells_written: 2,
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EntryKind::Run.to_string(), "RUN");
        assert_eq!(EntryKind::Allocation.to_string(), "ALLOCATION");
    }

    #[test]
    fn test_allocation_entry() {
        let run_id = RunId::new();
        let entry = AuditEntry::allocation(run_id, Utc::now(), &change());

        assert_eq!(entry.kind, EntryKind::Allocation);
        assert_eq!(entry.subject, "12");
        assert_eq!(entry.before.as_ref().unwrap().allocated, Money::zero());
        assert_eq!(
            entry.after.as_ref().unwrap().status,
            Some(StatusCategory::FullyPaid)
        );
        assert!(entry.diff_summary.unwrap().contains("0.00€ -> 30.00€"));
    }

    #[test]
    fn test_serialization() {
        let entry = AuditEntry::allocation(RunId::new(), Utc::now(), &change());

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"allocated\":3000"));
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.kind, EntryKind::Allocation);
        assert_eq!(deserialized.run_id, entry.run_id);
        assert!(deserialized.before.unwrap().status.is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::allocation(RunId::new(), Utc::now(), &change());

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("ALLOCATION"));
        assert!(formatted.contains("Haddad Lina"));
        assert!(formatted.contains("2 cells written"));
    }
}
