//! Ledger projection
//!
//! Decides which month cells a child's allocation should mark. Marking
//! resumes right after the last recorded month, or on the last recorded month
//! itself when that cell holds a partial amount (it gets rewritten). Because
//! allocations are cumulative, only the months the new allocation covers
//! beyond the child's prior allocation are marked. The ledger position is not
//! a count of paid months: leading not-registered months and rows written
//! before allocations were recorded sit in front of the resume point too.

use serde::Serialize;
use tracing::warn;

use super::allocation::AllocationResult;
use crate::models::{ChildId, ColorCode, LedgerCell, LedgerWindow, Money, MonthToken, PriorLedgerState};

/// Why a plan marks nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Marked not registered before and still nothing allocated
    NotRegistered,
    /// The allocation covers fewer months than the prior allocation did
    LedgerAhead,
}

/// Cells to write for one child
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkingPlan {
    pub child_id: ChildId,
    /// First window position the plan may write
    pub resume_index: usize,
    /// Consecutive months to mark fully paid, starting at `resume_index`
    pub full_months_to_mark: usize,
    pub full_color: ColorCode,
    /// Value written into fully paid months
    pub full_value: Money,
    /// Whether one partial month follows the full months
    pub has_extras_month: bool,
    pub extras_amount: Money,
    pub extras_color: ColorCode,
    /// Whether the month after the full months gets the unpaid marker
    pub unpaid_marker: bool,
    /// Months that fell past the end of the window
    pub overflow: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl MarkingPlan {
    fn skipped(result: &AllocationResult, resume_index: usize, reason: SkipReason) -> Self {
        Self {
            child_id: result.child_id.clone(),
            resume_index,
            full_months_to_mark: 0,
            full_color: result.color.clone(),
            full_value: result.monthly_fee,
            has_extras_month: false,
            extras_amount: Money::zero(),
            extras_color: result.extras_color.clone(),
            unpaid_marker: false,
            overflow: 0,
            skipped: Some(reason),
        }
    }

    /// Whether the plan writes anything
    pub fn is_noop(&self) -> bool {
        self.skipped.is_some()
            || (self.full_months_to_mark == 0 && !self.has_extras_month && !self.unpaid_marker)
    }

    /// Position right after the full months
    pub fn boundary_index(&self) -> usize {
        self.resume_index + self.full_months_to_mark
    }

    /// Cells to write, in month order
    pub fn cells(&self) -> Vec<(MonthToken, LedgerCell)> {
        if self.skipped.is_some() {
            return Vec::new();
        }

        let mut cells = Vec::with_capacity(self.full_months_to_mark + 1);
        for index in self.resume_index..self.boundary_index() {
            if let Some(month) = MonthToken::at(index) {
                let cell = if self.full_value.is_positive() {
                    LedgerCell::amount(self.full_value, self.full_color.clone())
                } else {
                    LedgerCell::marker(self.full_color.clone())
                };
                cells.push((month, cell));
            }
        }

        if let Some(month) = MonthToken::at(self.boundary_index()) {
            if self.has_extras_month {
                cells.push((
                    month,
                    LedgerCell::amount(self.extras_amount, self.extras_color.clone()),
                ));
            } else if self.unpaid_marker {
                cells.push((month, LedgerCell::marker(ColorCode::nothing_paid())));
            }
        }

        cells
    }
}

/// Where marking resumes for a prior ledger state
pub fn resume_index(prior: &PriorLedgerState) -> usize {
    match prior.last_recorded_month {
        None => 0,
        Some(month) if prior.ends_with_partial() => month.index(),
        Some(month) => month.index() + 1,
    }
}

fn month_count(months: i64) -> usize {
    usize::try_from(months.max(0)).unwrap_or(usize::MAX)
}

/// Plan the cells for one child
///
/// `prior_allocated` is the cumulative amount the child held before this run;
/// the months it already covered are on the ledger and are not marked again.
pub fn plan(
    result: &AllocationResult,
    prior: &PriorLedgerState,
    prior_allocated: Money,
    window: LedgerWindow,
) -> MarkingPlan {
    let resume = resume_index(prior);

    if prior.is_not_registered() && result.allocated.is_zero() {
        return MarkingPlan::skipped(result, resume, SkipReason::NotRegistered);
    }

    let covered = month_count(result.full_months());
    let already_marked =
        month_count(prior_allocated.non_negative().whole_units_of(result.monthly_fee));
    if covered < already_marked {
        warn!(
            child = %result.child_id,
            covered_months = covered,
            prior_months = already_marked,
            "Allocation covers fewer months than before, leaving the ledger untouched"
        );
        return MarkingPlan::skipped(result, resume, SkipReason::LedgerAhead);
    }

    let wanted_full = covered - already_marked;
    let window_len = window.len();
    let room = window_len.saturating_sub(resume);
    let full_months_to_mark = wanted_full.min(room);
    let mut overflow = wanted_full - full_months_to_mark;

    let has_extras = result.has_extras();
    let boundary = resume + full_months_to_mark;
    let boundary_fits = boundary < window_len;
    if has_extras && !boundary_fits {
        overflow += 1;
    }

    if overflow > 0 {
        warn!(
            child = %result.child_id,
            overflow,
            "Allocation runs past the end of the ledger window"
        );
    }

    MarkingPlan {
        child_id: result.child_id.clone(),
        resume_index: resume,
        full_months_to_mark,
        full_color: result.color.clone(),
        full_value: result.monthly_fee,
        has_extras_month: has_extras && boundary_fits,
        extras_amount: if has_extras { result.extras } else { Money::zero() },
        extras_color: result.extras_color.clone(),
        unpaid_marker: !has_extras && boundary_fits && overflow == 0,
        overflow,
        skipped: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::allocation::AllocationEngine;
    use crate::services::fees::FeeSchedule;
    use crate::services::grouping::{GroupMember, ParentGroup};
    use std::collections::HashMap;

    fn result_for(class: &str, total: Money) -> AllocationResult {
        let fees = FeeSchedule::default();
        let group = ParentGroup::new(None, vec![GroupMember::new("1", "Haddad Lina", class)]);
        let priors = HashMap::from([(ChildId::new("1"), total)]);
        AllocationEngine::new(&fees)
            .allocate_group(&group, Money::zero(), &priors)
            .results
            .remove(0)
    }

    fn prior(index: usize, color: ColorCode) -> PriorLedgerState {
        PriorLedgerState {
            last_recorded_month: MonthToken::at(index),
            last_recorded_color: Some(color),
            last_recorded_text: None,
        }
    }

    #[test]
    fn test_fresh_ledger_marks_full_and_extras() {
        let result = result_for("A6", Money::from_euros(55));
        let plan = plan(&result, &PriorLedgerState::empty(), Money::zero(), LedgerWindow::TwoYear);

        assert_eq!(plan.resume_index, 0);
        assert_eq!(plan.full_months_to_mark, 2);
        assert!(plan.has_extras_month);
        assert_eq!(plan.extras_amount, Money::from_euros(5));
        assert!(!plan.unpaid_marker);

        let cells = plan.cells();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].1.text(), Some("25"));
        assert_eq!(cells[2].0.label(), "11");
        assert_eq!(cells[2].1.color, Some(ColorCode::partial()));
    }

    #[test]
    fn test_exact_months_get_unpaid_marker() {
        let result = result_for("B1", Money::from_euros(30));
        let plan = plan(&result, &PriorLedgerState::empty(), Money::zero(), LedgerWindow::TwoYear);

        assert_eq!(plan.full_months_to_mark, 2);
        assert!(!plan.has_extras_month);
        assert!(plan.unpaid_marker);
        let cells = plan.cells();
        assert_eq!(cells[2].1, LedgerCell::marker(ColorCode::nothing_paid()));
    }

    #[test]
    fn test_resumes_after_fully_paid_month() {
        let result = result_for("A6", Money::from_euros(75));
        let plan = plan(
            &result,
            &prior(1, ColorCode::fully_paid()),
            Money::from_euros(50),
            LedgerWindow::TwoYear,
        );

        assert_eq!(plan.resume_index, 2);
        assert_eq!(plan.full_months_to_mark, 1);
        assert_eq!(plan.cells()[0].0.index(), 2);
    }

    #[test]
    fn test_partial_month_is_rewritten() {
        let result = result_for("A6", Money::from_euros(50));
        let plan = plan(
            &result,
            &prior(1, ColorCode::partial()),
            Money::from_euros(30),
            LedgerWindow::TwoYear,
        );

        assert_eq!(plan.resume_index, 1);
        assert_eq!(plan.full_months_to_mark, 1);
        assert_eq!(plan.cells()[0].0.index(), 1);
    }

    #[test]
    fn test_rerun_with_same_allocation_is_stable() {
        let result = result_for("A6", Money::from_euros(30));
        let first = plan(&result, &PriorLedgerState::empty(), Money::zero(), LedgerWindow::TwoYear);
        assert_eq!(first.boundary_index(), 1);

        let again = plan(
            &result,
            &prior(1, ColorCode::partial()),
            Money::from_euros(30),
            LedgerWindow::TwoYear,
        );
        assert_eq!(again.full_months_to_mark, 0);
        assert!(again.has_extras_month);
        assert_eq!(again.cells(), vec![(
            MonthToken::at(1).unwrap(),
            LedgerCell::amount(Money::from_euros(5), ColorCode::partial())
        )]);
    }

    #[test]
    fn test_shrinking_allocation_is_skipped() {
        let result = result_for("A6", Money::from_euros(25));
        let plan = plan(
            &result,
            &prior(2, ColorCode::fully_paid()),
            Money::from_euros(75),
            LedgerWindow::TwoYear,
        );

        assert_eq!(plan.skipped, Some(SkipReason::LedgerAhead));
        assert!(plan.cells().is_empty());
        assert!(plan.is_noop());
    }

    #[test]
    fn test_not_registered_without_allocation_is_skipped() {
        let result = result_for("A6", Money::zero());
        let plan = plan(
            &result,
            &prior(0, ColorCode::not_registered()),
            Money::zero(),
            LedgerWindow::TwoYear,
        );
        assert_eq!(plan.skipped, Some(SkipReason::NotRegistered));
    }

    #[test]
    fn test_payment_after_not_registered_months() {
        let result = result_for("A6", Money::from_euros(50));
        let plan = plan(
            &result,
            &prior(3, ColorCode::not_registered()),
            Money::zero(),
            LedgerWindow::TwoYear,
        );

        assert_eq!(plan.skipped, None);
        assert_eq!(plan.resume_index, 4);
        assert_eq!(plan.full_months_to_mark, 2);
        assert!(plan.unpaid_marker);

        let cells = plan.cells();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].0.index(), 4);
        assert_eq!(cells[1].1, LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid()));
        assert_eq!(cells[2].1, LedgerCell::marker(ColorCode::nothing_paid()));
    }

    #[test]
    fn test_legacy_row_without_recorded_allocation() {
        let result = result_for("A6", Money::from_euros(50));
        let plan = plan(
            &result,
            &prior(2, ColorCode::fully_paid()),
            Money::zero(),
            LedgerWindow::TwoYear,
        );

        assert_eq!(plan.skipped, None);
        assert_eq!(plan.resume_index, 3);
        assert_eq!(plan.full_months_to_mark, 2);
        assert_eq!(plan.cells()[0].0.index(), 3);
        assert_eq!(plan.boundary_index(), 5);
    }

    #[test]
    fn test_overflow_is_clamped_to_window() {
        let result = result_for("A6", Money::from_euros(25 * 20 + 5));
        let plan = plan(&result, &PriorLedgerState::empty(), Money::zero(), LedgerWindow::OneAndHalfYear);

        assert_eq!(plan.full_months_to_mark, 17);
        assert_eq!(plan.overflow, 4);
        assert!(!plan.has_extras_month);
        assert!(!plan.unpaid_marker);
        assert_eq!(plan.cells().len(), 17);
    }
}
