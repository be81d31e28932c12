//! Payment totals per parent
//!
//! Matches statement records to roster parents and folds them into one new
//! payment per parent. Records whose import id was applied by an earlier run
//! are skipped so re-running a statement never counts a transfer twice.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::matching::PayerMatcher;
use crate::models::{ImportId, Money, ParentName, PaymentRecord};

/// How several records of one parent combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAggregation {
    /// Every matched record counts
    #[default]
    Sum,
    /// The last matched record in statement order wins
    LastRecord,
}

/// New payments of a run
#[derive(Debug, Clone, Default)]
pub struct PaymentTotals {
    /// New payment per roster parent
    pub by_parent: HashMap<ParentName, Money>,
    /// Import ids consumed by this run
    pub applied: Vec<ImportId>,
    /// Records already applied by an earlier run
    pub duplicates: usize,
    /// Records with no roster parent
    pub unmatched: Vec<PaymentRecord>,
    /// Records with a zero amount after coercion
    pub empty: usize,
}

impl PaymentTotals {
    /// Total of the new payments
    pub fn total(&self) -> Money {
        self.by_parent.values().sum()
    }

    /// New payment for a parent
    pub fn for_parent(&self, parent: &ParentName) -> Money {
        self.by_parent.get(parent).copied().unwrap_or_default()
    }
}

/// Service folding statement records into per-parent payments
pub struct PaymentService<'a, M: PayerMatcher + ?Sized> {
    matcher: &'a M,
    aggregation: PaymentAggregation,
}

impl<'a, M: PayerMatcher + ?Sized> PaymentService<'a, M> {
    /// Create a new payment service
    pub fn new(matcher: &'a M, aggregation: PaymentAggregation) -> Self {
        Self {
            matcher,
            aggregation,
        }
    }

    /// Match and aggregate records against the roster's parents
    pub fn totals(
        &self,
        records: &[PaymentRecord],
        parents: &[ParentName],
        already_applied: &BTreeSet<ImportId>,
    ) -> PaymentTotals {
        let mut totals = PaymentTotals::default();

        for record in records {
            if already_applied.contains(&record.import_id) {
                debug!(row = record.row_number, import_id = %record.import_id, "Record already applied");
                totals.duplicates += 1;
                continue;
            }

            let Some(parent) = self.matcher.match_payer(&record.payer_name, parents) else {
                warn!(
                    row = record.row_number,
                    payer = %record.payer_name,
                    amount = %record.amount,
                    "No roster parent matches payer"
                );
                totals.unmatched.push(record.clone());
                continue;
            };

            if record.amount.is_zero() {
                totals.empty += 1;
            }

            match self.aggregation {
                PaymentAggregation::Sum => {
                    *totals.by_parent.entry(parent).or_default() += record.amount;
                }
                PaymentAggregation::LastRecord => {
                    totals.by_parent.insert(parent, record.amount);
                }
            }
            totals.applied.push(record.import_id.clone());
        }

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::matching::SubstringMatcher;

    fn record(payer: &str, euros: i64, row: usize) -> PaymentRecord {
        PaymentRecord::new(payer, Money::from_euros(euros), None, row)
    }

    fn parents() -> Vec<ParentName> {
        ["Karim Haddad", "Nadia Benali"]
            .iter()
            .filter_map(|name| ParentName::normalize(name))
            .collect()
    }

    fn karim() -> ParentName {
        ParentName::normalize("Karim Haddad").unwrap()
    }

    #[test]
    fn test_sum_aggregation() {
        let records = vec![
            record("Karim Haddad", 25, 1),
            record("Nadia Benali", 15, 2),
            record("KARIM HADDAD", 20, 3),
        ];
        let service = PaymentService::new(&SubstringMatcher, PaymentAggregation::Sum);
        let totals = service.totals(&records, &parents(), &BTreeSet::new());

        assert_eq!(totals.for_parent(&karim()), Money::from_euros(45));
        assert_eq!(totals.total(), Money::from_euros(60));
        assert_eq!(totals.applied.len(), 3);
    }

    #[test]
    fn test_last_record_aggregation() {
        let records = vec![record("Karim Haddad", 25, 1), record("Karim Haddad", 20, 2)];
        let service = PaymentService::new(&SubstringMatcher, PaymentAggregation::LastRecord);
        let totals = service.totals(&records, &parents(), &BTreeSet::new());

        assert_eq!(totals.for_parent(&karim()), Money::from_euros(20));
    }

    #[test]
    fn test_applied_records_are_skipped() {
        let records = vec![record("Karim Haddad", 25, 1), record("Karim Haddad", 20, 2)];
        let applied = BTreeSet::from([records[0].import_id.clone()]);
        let service = PaymentService::new(&SubstringMatcher, PaymentAggregation::Sum);
        let totals = service.totals(&records, &parents(), &applied);

        assert_eq!(totals.duplicates, 1);
        assert_eq!(totals.for_parent(&karim()), Money::from_euros(20));
        assert_eq!(totals.applied, vec![records[1].import_id.clone()]);
    }

    #[test]
    fn test_unmatched_payers_are_reported() {
        let records = vec![record("Stadtwerke", 80, 1)];
        let service = PaymentService::new(&SubstringMatcher, PaymentAggregation::Sum);
        let totals = service.totals(&records, &parents(), &BTreeSet::new());

        assert_eq!(totals.unmatched.len(), 1);
        assert!(totals.by_parent.is_empty());
        assert!(totals.applied.is_empty());
    }
}
