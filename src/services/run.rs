//! Processing run
//!
//! One run takes a roster snapshot and a statement, allocates every parent
//! group and returns the updated roster together with a report. The input
//! roster is never modified: callers persist the returned roster only when
//! the whole run succeeded.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, info_span};

use super::allocation::{Allocation, AllocationEngine};
use super::classifier::StatusCategory;
use super::fees::FeeSchedule;
use super::grouping::ParentGroups;
use super::matching::{fill_missing_parents, PayerMatcher, SubstringMatcher};
use super::payments::PaymentService;
use super::prior::{prior_allocation, read_prior_state};
use super::projection::{plan, MarkingPlan};
use super::writer::{apply_plan, record_allocation};
use crate::config::settings::{RunMode, Settings};
use crate::error::LedgerResult;
use crate::models::{ChildId, LedgerWindow, Money, PaymentRecord, RunId};
use crate::storage::Roster;

/// What a run changed for one child
#[derive(Debug, Clone, PartialEq)]
pub struct ChildChange {
    pub child_id: ChildId,
    pub name: String,
    pub allocated_before: Money,
    pub allocated_after: Money,
    pub status_before: Option<StatusCategory>,
    pub status_after: StatusCategory,
    pub status_text: String,
    pub cells_written: usize,
}

/// Statement side of a run
#[derive(Debug, Clone, Default)]
pub struct PaymentSummary {
    pub records: usize,
    pub applied: usize,
    pub duplicates: usize,
    pub unmatched: Vec<String>,
    pub total: Money,
}

/// Everything a run decided
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub mode: RunMode,
    pub window: LedgerWindow,
    pub window_extended: bool,
    /// Children processed by the run
    pub processed: usize,
    /// Children after the processed range, carried through untouched
    pub carried: usize,
    pub parents_inferred: usize,
    pub payments: PaymentSummary,
    pub allocation: Allocation,
    pub plans: Vec<MarkingPlan>,
    pub changes: Vec<ChildChange>,
}

impl RunReport {
    /// Plan for one child
    pub fn plan_for(&self, child_id: &ChildId) -> Option<&MarkingPlan> {
        self.plans.iter().find(|plan| &plan.child_id == child_id)
    }
}

/// Updated roster and the report that produced it
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub roster: Roster,
    pub report: RunReport,
}

/// Service running allocation over a roster
pub struct RunService<'a> {
    settings: &'a Settings,
    fees: &'a FeeSchedule,
    matcher: &'a dyn PayerMatcher,
}

impl<'a> RunService<'a> {
    /// Create a run service with the default payer matcher
    pub fn new(settings: &'a Settings, fees: &'a FeeSchedule) -> Self {
        Self {
            settings,
            fees,
            matcher: &SubstringMatcher,
        }
    }

    /// Use a different payer matcher
    pub fn with_matcher(mut self, matcher: &'a dyn PayerMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Run allocation over a roster snapshot
    pub fn execute(
        &self,
        roster: &Roster,
        records: &[PaymentRecord],
        mode: RunMode,
    ) -> LedgerResult<RunOutcome> {
        let run_id = RunId::new();
        let span = info_span!("run", run = %run_id);
        let _guard = span.enter();

        let started_at = Utc::now();
        let mut roster = roster.clone();
        let window_extended = roster.extend_window();
        let window = roster.window;

        let range = roster.processing_range(mode, self.settings.test_row_limit);
        roster.validate(range.clone())?;
        let carried = roster.children.len() - range.end;

        info!(
            ?mode,
            children = range.len(),
            carried,
            records = records.len(),
            "Starting run"
        );

        let processed = &mut roster.children[range.clone()];
        for child in processed.iter_mut() {
            child.split_parent_contact();
        }
        let payers: Vec<String> = records.iter().map(|r| r.payer_name.clone()).collect();
        let parents_inferred = fill_missing_parents(processed, &payers);

        let groups = ParentGroups::from_children(processed.iter());
        let totals = PaymentService::new(self.matcher, self.settings.payment_aggregation).totals(
            records,
            &groups.parents(),
            &roster.applied_imports,
        );

        let priors: HashMap<ChildId, Money> = processed
            .iter()
            .map(|child| {
                (
                    child.child_id.clone(),
                    prior_allocation(child, self.settings.prior_source, window),
                )
            })
            .collect();

        let allocation = AllocationEngine::new(self.fees).allocate(&groups, &totals.by_parent, &priors);

        let mut plans = Vec::with_capacity(allocation.child_count());
        let mut changes = Vec::new();

        for result in allocation.results() {
            let Some(child) = processed.iter_mut().find(|c| c.child_id == result.child_id) else {
                continue;
            };

            let prior_state = read_prior_state(child, window);
            let prior_allocated = priors.get(&result.child_id).copied().unwrap_or_default();
            let marking = plan(result, &prior_state, prior_allocated, window);
            let allocated_before = child.allocated;
            let cells_before = child.cells.clone();
            let cells_written = apply_plan(child, &marking);
            record_allocation(child, result);

            if allocated_before != result.allocated || child.cells != cells_before {
                changes.push(ChildChange {
                    child_id: result.child_id.clone(),
                    name: result.name.clone(),
                    allocated_before,
                    allocated_after: result.allocated,
                    status_before: prior_state
                        .last_recorded_color
                        .as_ref()
                        .map(StatusCategory::from_color),
                    status_after: result.status.category(),
                    status_text: result.status.text(),
                    cells_written,
                });
            }
            plans.push(marking);
        }

        let payments = PaymentSummary {
            records: records.len(),
            applied: totals.applied.len(),
            duplicates: totals.duplicates,
            unmatched: totals.unmatched.iter().map(|r| r.payer_name.clone()).collect(),
            total: totals.total(),
        };
        roster.applied_imports.extend(totals.applied);

        info!(
            groups = allocation.groups.len(),
            changed = changes.len(),
            new_payments = %payments.total,
            duplicates = payments.duplicates,
            unmatched = payments.unmatched.len(),
            "Run complete"
        );

        let report = RunReport {
            run_id,
            started_at,
            mode,
            window,
            window_extended,
            processed: range.len(),
            carried,
            parents_inferred,
            payments,
            allocation,
            plans,
            changes,
        };

        Ok(RunOutcome { roster, report })
    }
}
