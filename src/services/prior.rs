//! Prior ledger state
//!
//! Reads where each child's ledger row left off and what the child had been
//! allocated before this run.

use serde::{Deserialize, Serialize};

use crate::models::{Child, LedgerWindow, Money, PriorLedgerState};

/// Where the prior allocated total of a child comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriorSource {
    /// The allocation stored by the previous run
    #[default]
    RecordedAllocation,
    /// The amounts written into the child's month cells
    LedgerCells,
}

/// Last recorded month of a child's row
///
/// Scans the window backwards. Unpaid markers are skipped; the first cell
/// carrying a value or a non-blank color is the last recorded month.
pub fn read_prior_state(child: &Child, window: LedgerWindow) -> PriorLedgerState {
    let tokens: Vec<_> = window.tokens().collect();

    for month in tokens.into_iter().rev() {
        let Some(cell) = child.cell(month) else {
            continue;
        };

        if cell.color.as_ref().is_some_and(|c| c.is_nothing_paid()) {
            continue;
        }

        if !cell.is_empty() {
            return PriorLedgerState {
                last_recorded_month: Some(month),
                last_recorded_color: cell.color.clone(),
                last_recorded_text: cell.text().map(str::to_string),
            };
        }
    }

    PriorLedgerState::empty()
}

/// Sum of the amounts written into a child's month cells
pub fn ledger_cell_total(child: &Child, window: LedgerWindow) -> Money {
    window
        .tokens()
        .filter_map(|month| child.cell(month))
        .filter_map(|cell| cell.amount_value())
        .filter(|amount| amount.is_positive())
        .sum()
}

/// Prior allocated total of a child under a source policy
pub fn prior_allocation(child: &Child, source: PriorSource, window: LedgerWindow) -> Money {
    match source {
        PriorSource::RecordedAllocation => child.allocated.non_negative(),
        PriorSource::LedgerCells => ledger_cell_total(child, window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorCode, LedgerCell, MonthToken};

    fn month(index: usize) -> MonthToken {
        MonthToken::at(index).unwrap()
    }

    fn child_with_cells(cells: &[(usize, LedgerCell)]) -> Child {
        let mut child = Child::new("1", "Haddad Lina", "A6", Some("Karim Haddad"));
        for (index, cell) in cells {
            child.set_cell(month(*index), cell.clone());
        }
        child
    }

    #[test]
    fn test_empty_row_has_no_prior_month() {
        let child = child_with_cells(&[]);
        assert_eq!(
            read_prior_state(&child, LedgerWindow::TwoYear),
            PriorLedgerState::empty()
        );
    }

    #[test]
    fn test_unpaid_markers_are_skipped() {
        let child = child_with_cells(&[
            (0, LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid())),
            (1, LedgerCell::amount(Money::from_euros(5), ColorCode::partial())),
            (2, LedgerCell::marker(ColorCode::nothing_paid())),
        ]);

        let prior = read_prior_state(&child, LedgerWindow::TwoYear);
        assert_eq!(prior.last_recorded_month, Some(month(1)));
        assert_eq!(prior.last_recorded_text.as_deref(), Some("5"));
        assert!(prior.ends_with_partial());
    }

    #[test]
    fn test_colored_cell_without_value_counts() {
        let child = child_with_cells(&[(3, LedgerCell::marker(ColorCode::not_registered()))]);
        let prior = read_prior_state(&child, LedgerWindow::TwoYear);
        assert_eq!(prior.last_recorded_month, Some(month(3)));
        assert!(prior.is_not_registered());
    }

    #[test]
    fn test_cells_outside_window_are_ignored() {
        let child = child_with_cells(&[
            (2, LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid())),
            (20, LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid())),
        ]);
        let prior = read_prior_state(&child, LedgerWindow::OneAndHalfYear);
        assert_eq!(prior.last_recorded_month, Some(month(2)));
    }

    #[test]
    fn test_prior_allocation_sources() {
        let mut child = child_with_cells(&[
            (0, LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid())),
            (1, LedgerCell::amount(Money::from_cents(1_250), ColorCode::partial())),
            (2, LedgerCell::marker(ColorCode::nothing_paid())),
        ]);
        child.allocated = Money::from_euros(40);

        assert_eq!(
            prior_allocation(&child, PriorSource::RecordedAllocation, LedgerWindow::TwoYear),
            Money::from_euros(40)
        );
        assert_eq!(
            prior_allocation(&child, PriorSource::LedgerCells, LedgerWindow::TwoYear),
            Money::from_cents(3_750)
        );
    }
}
