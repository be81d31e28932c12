//! Payment report
//!
//! Flat, serializable view of a run (or of a roster's recorded state) used by
//! the terminal table and the CSV, JSON and YAML exports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::allocation::{AllocationEngine, AllocationResult};
use super::classifier::StatusCategory;
use super::fees::FeeSchedule;
use super::run::RunReport;
use crate::models::{ChildId, ClassId, ColorCode, Money, RunId};
use crate::storage::Roster;

/// One child in a payment report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub child_id: ChildId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub class: ClassId,
    pub monthly_fee: Money,
    pub allocated: Money,
    pub months_paid: f64,
    pub extras: Money,
    pub status: String,
    pub category: StatusCategory,
    pub color: ColorCode,
    /// Cells written for the child by the run
    pub cells_written: usize,
}

impl ReportRow {
    fn from_result(result: &AllocationResult, cells_written: usize) -> Self {
        Self {
            child_id: result.child_id.clone(),
            name: result.name.clone(),
            parent: result.parent.clone(),
            class: result.class.clone(),
            monthly_fee: result.monthly_fee,
            allocated: result.allocated,
            months_paid: result.months_paid,
            extras: result.extras,
            status: result.status.text(),
            category: result.status.category(),
            color: result.color.clone(),
            cells_written,
        }
    }
}

/// Counts and sums over a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub children: usize,
    pub fully_paid: usize,
    pub underpaid: usize,
    pub nothing_paid: usize,
    pub not_registered: usize,
    pub allocated: Money,
    /// New payments applied by the run, zero for roster reports
    pub new_payments: Money,
    pub unmatched_payers: usize,
}

impl ReportTotals {
    fn add(&mut self, row: &ReportRow) {
        self.children += 1;
        self.allocated += row.allocated;
        match row.category {
            StatusCategory::FullyPaid => self.fully_paid += 1,
            StatusCategory::NothingPaid => self.nothing_paid += 1,
            StatusCategory::NotYetRegistered => self.not_registered += 1,
            StatusCategory::SpecialUnderpay
            | StatusCategory::KnownAmountUnderpay
            | StatusCategory::PartialPayment => self.underpaid += 1,
            StatusCategory::Unknown => {}
        }
    }
}

/// Payment report
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReport {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
    /// Payer names with no roster parent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_payers: Vec<String>,
}

impl PaymentReport {
    /// Report of a completed run
    pub fn from_run(run: &RunReport) -> Self {
        let rows = run
            .allocation
            .results()
            .map(|result| {
                let written = run
                    .changes
                    .iter()
                    .find(|change| change.child_id == result.child_id)
                    .map(|change| change.cells_written)
                    .unwrap_or(0);
                ReportRow::from_result(result, written)
            })
            .collect();

        let mut report = Self::from_rows(run.started_at, Some(run.run_id), rows);
        report.totals.new_payments = run.payments.total;
        report.totals.unmatched_payers = run.payments.unmatched.len();
        report.unmatched_payers = run.payments.unmatched.clone();
        report
    }

    /// Report of the allocations recorded in a roster
    pub fn from_roster(roster: &Roster, fees: &FeeSchedule) -> Self {
        let engine = AllocationEngine::new(fees);
        let rows = roster
            .children
            .iter()
            .take_while(|child| !child.child_id.is_empty())
            .map(|child| ReportRow::from_result(&engine.evaluate(child), 0))
            .collect();

        Self::from_rows(Utc::now(), None, rows)
    }

    fn from_rows(generated_at: DateTime<Utc>, run_id: Option<RunId>, rows: Vec<ReportRow>) -> Self {
        let mut totals = ReportTotals::default();
        for row in &rows {
            totals.add(row);
        }
        Self {
            generated_at,
            run_id,
            rows,
            totals,
            unmatched_payers: Vec::new(),
        }
    }

    /// Rows still owing money
    pub fn outstanding(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|row| {
            matches!(
                row.category,
                StatusCategory::NothingPaid
                    | StatusCategory::SpecialUnderpay
                    | StatusCategory::KnownAmountUnderpay
                    | StatusCategory::PartialPayment
            )
        })
    }
}
