//! Change summaries for audit entries

use crate::services::run::ChildChange;

/// Summarize what a run changed for one child
///
/// Returns `None` when neither the allocation, the status nor the ledger
/// cells changed.
pub fn change_summary(change: &ChildChange) -> Option<String> {
    let mut parts = Vec::new();

    if change.allocated_before != change.allocated_after {
        parts.push(format!(
            "allocated: {} -> {}",
            change.allocated_before, change.allocated_after
        ));
    }

    match change.status_before {
        Some(before) if before != change.status_after => {
            parts.push(format!("status: {} -> {}", before, change.status_after));
        }
        None => parts.push(format!("status: (none) -> {}", change.status_after)),
        _ => {}
    }

    if change.cells_written > 0 {
        let noun = if change.cells_written == 1 { "cell" } else { "cells" };
        parts.push(format!("{} {} written", change.cells_written, noun));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChildId, Money};
    use crate::services::classifier::StatusCategory;

    fn change() -> ChildChange {
        ChildChange {
            child_id: ChildId::new("4"),
            name: "Rami Nour".into(),
            allocated_before: Money::from_euros(10),
            allocated_after: Money::from_euros(25),
            status_before: Some(StatusCategory::PartialPayment),
            status_after: StatusCategory::FullyPaid,
            status_text: "Fully paid".into(),
            cells_written: 2,
        }
    }

    #[test]
    fn test_full_summary() {
        let summary = change_summary(&change()).unwrap();
        assert_eq!(
            summary,
            "allocated: 10.00€ -> 25.00€, status: Partial payment -> Fully paid, 2 cells written"
        );
    }

    #[test]
    fn test_first_status() {
        let mut change = change();
        change.status_before = None;
        change.cells_written = 1;
        let summary = change_summary(&change).unwrap();
        assert!(summary.contains("status: (none) -> Fully paid"));
        assert!(summary.ends_with("1 cell written"));
    }

    #[test]
    fn test_nothing_changed() {
        let mut change = change();
        change.allocated_before = change.allocated_after;
        change.status_before = Some(StatusCategory::FullyPaid);
        change.cells_written = 0;
        assert!(change_summary(&change).is_none());
    }
}
