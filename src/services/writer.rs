//! Ledger writer
//!
//! Applies marking plans to children's month cells and records the new
//! cumulative allocation.

use tracing::trace;

use super::allocation::AllocationResult;
use super::projection::MarkingPlan;
use crate::models::Child;

/// Write a plan into a child's row, returning the number of cells written
pub fn apply_plan(child: &mut Child, plan: &MarkingPlan) -> usize {
    let cells = plan.cells();
    let written = cells.len();
    for (month, cell) in cells {
        trace!(child = %child.child_id, month = %month, value = ?cell.value, "Writing cell");
        child.set_cell(month, cell);
    }
    written
}

/// Store the allocation so the next run can resume from it
pub fn record_allocation(child: &mut Child, result: &AllocationResult) {
    child.allocated = result.allocated;
}
