//! Payment allocation engine
//!
//! Splits each parent's cumulative payments across the parent's children.
//! Per group:
//!
//! - the effective total is the children's prior allocations plus the
//!   parent's new payment
//! - the group fee is the sum of the children's monthly fees
//! - every child gets `floor(total / group fee)` months at its own fee
//! - the whole remainder goes to the first child of the group
//!
//! All arithmetic is in cents, so the children's allocations always add up
//! to the effective total. `months_paid` is the only rounded value and is
//! rounded after classification.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::classifier::{classify, PaymentStatus};
use super::fees::FeeSchedule;
use super::grouping::{GroupMember, ParentGroup, ParentGroups};
use crate::models::{Child, ChildId, ClassId, ColorCode, Money, ParentName};

/// Amount above which a leftover counts as a partial month
const EXTRAS_THRESHOLD: Money = Money::from_cents(1);

/// Allocation outcome for one child
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub child_id: ChildId,
    pub name: String,
    pub class: ClassId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub monthly_fee: Money,
    /// Cumulative amount allocated to the child
    pub allocated: Money,
    /// `allocated / monthly_fee`, rounded to two decimals
    pub months_paid: f64,
    pub status: PaymentStatus,
    pub color: ColorCode,
    /// Amount beyond the child's last fully covered month
    pub extras: Money,
    pub extras_color: ColorCode,
}

impl AllocationResult {
    /// Whole months covered by the allocation
    pub fn full_months(&self) -> i64 {
        self.allocated.whole_units_of(self.monthly_fee)
    }

    /// Whether a leftover partial month exists
    pub fn has_extras(&self) -> bool {
        self.extras.is_positive()
    }
}

/// Allocation of one parent group, with the intermediate sums
#[derive(Debug, Clone)]
pub struct GroupAllocation {
    pub parent: Option<ParentName>,
    pub prior_total: Money,
    pub new_payment: Money,
    pub total_effective: Money,
    pub total_monthly_fee: Money,
    pub full_months_total: i64,
    pub remainder: Money,
    pub results: Vec<AllocationResult>,
}

impl GroupAllocation {
    /// Sum of the children's allocations
    pub fn allocated_total(&self) -> Money {
        self.results.iter().map(|r| r.allocated).sum()
    }
}

/// Allocations of a whole run, in group order
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub groups: Vec<GroupAllocation>,
}

impl Allocation {
    /// Every child result, in group order
    pub fn results(&self) -> impl Iterator<Item = &AllocationResult> {
        self.groups.iter().flat_map(|group| group.results.iter())
    }

    /// Result for one child
    pub fn result_for(&self, child_id: &ChildId) -> Option<&AllocationResult> {
        self.results().find(|result| &result.child_id == child_id)
    }

    /// Results keyed by child
    pub fn by_child(&self) -> HashMap<ChildId, &AllocationResult> {
        self.results()
            .map(|result| (result.child_id.clone(), result))
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.groups.iter().map(|group| group.results.len()).sum()
    }
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stateless allocator over a fee schedule
pub struct AllocationEngine<'a> {
    fees: &'a FeeSchedule,
}

impl<'a> AllocationEngine<'a> {
    /// Create a new allocation engine
    pub fn new(fees: &'a FeeSchedule) -> Self {
        Self { fees }
    }

    /// Allocate every group
    ///
    /// Parents missing from `payments` paid nothing new; children missing
    /// from `priors` start from zero.
    pub fn allocate(
        &self,
        groups: &ParentGroups,
        payments: &HashMap<ParentName, Money>,
        priors: &HashMap<ChildId, Money>,
    ) -> Allocation {
        let groups = groups
            .iter()
            .map(|group| {
                let new_payment = group
                    .parent
                    .as_ref()
                    .and_then(|parent| payments.get(parent))
                    .copied()
                    .unwrap_or_default();
                self.allocate_group(group, new_payment, priors)
            })
            .collect();

        Allocation { groups }
    }

    /// Allocate one group
    pub fn allocate_group(
        &self,
        group: &ParentGroup,
        new_payment: Money,
        priors: &HashMap<ChildId, Money>,
    ) -> GroupAllocation {
        let parent_label = group.parent.as_ref().map(|p| p.as_str().to_string());
        let new_payment = new_payment.non_negative();

        let prior_total: Money = group
            .members
            .iter()
            .map(|member| {
                priors
                    .get(&member.child_id)
                    .copied()
                    .unwrap_or_default()
                    .non_negative()
            })
            .sum();
        let total_effective = prior_total + new_payment;

        let fees: Vec<Money> = group
            .members
            .iter()
            .map(|member| self.fees.monthly_fee(&member.class))
            .collect();
        let total_monthly_fee: Money = fees.iter().sum();

        if !total_monthly_fee.is_positive() {
            if total_effective.is_positive() {
                warn!(
                    parent = parent_label.as_deref().unwrap_or("-"),
                    amount = %total_effective,
                    "Group has no billable fee, payments are not allocated"
                );
            }

            let results = group
                .members
                .iter()
                .map(|member| unregistered_result(member, parent_label.clone()))
                .collect();

            return GroupAllocation {
                parent: group.parent.clone(),
                prior_total,
                new_payment,
                total_effective,
                total_monthly_fee,
                full_months_total: 0,
                remainder: Money::zero(),
                results,
            };
        }

        let full_months_total = total_effective.whole_units_of(total_monthly_fee);
        let remainder = total_effective.remainder_of(total_monthly_fee);

        debug!(
            parent = parent_label.as_deref().unwrap_or("-"),
            children = group.len(),
            %prior_total,
            %new_payment,
            %total_monthly_fee,
            full_months_total,
            %remainder,
            "Allocating group"
        );

        let results = group
            .members
            .iter()
            .zip(fees)
            .enumerate()
            .map(|(position, (member, fee))| {
                let mut allocated = fee * full_months_total;
                if position == 0 {
                    allocated += remainder;
                }
                child_result(member, parent_label.clone(), fee, allocated)
            })
            .collect();

        GroupAllocation {
            parent: group.parent.clone(),
            prior_total,
            new_payment,
            total_effective,
            total_monthly_fee,
            full_months_total,
            remainder,
            results,
        }
    }

    /// Classify a child's recorded allocation without new payments
    pub fn evaluate(&self, child: &Child) -> AllocationResult {
        let member = GroupMember::from(child);
        let parent = child.parent().map(|p| p.as_str().to_string());
        let fee = self.fees.monthly_fee(&member.class);
        if fee.is_positive() {
            child_result(&member, parent, fee, child.allocated.non_negative())
        } else {
            unregistered_result(&member, parent)
        }
    }
}

fn unregistered_result(member: &GroupMember, parent: Option<String>) -> AllocationResult {
    let status = PaymentStatus::NotYetRegistered;
    let color = status.color();
    AllocationResult {
        child_id: member.child_id.clone(),
        name: member.name.clone(),
        class: member.class.clone(),
        parent,
        monthly_fee: Money::zero(),
        allocated: Money::zero(),
        months_paid: 0.0,
        extras: Money::zero(),
        extras_color: color.clone(),
        status,
        color,
    }
}

fn child_result(
    member: &GroupMember,
    parent: Option<String>,
    fee: Money,
    allocated: Money,
) -> AllocationResult {
    let months_paid = allocated.ratio_to(fee);
    let status = classify(months_paid, fee, allocated, &member.class);
    let color = status.color();

    let (extras, extras_color) = if fee.is_positive() {
        let extras = allocated.remainder_of(fee);
        let extras_color = if extras > EXTRAS_THRESHOLD {
            ColorCode::partial()
        } else {
            ColorCode::fully_paid()
        };
        (extras, extras_color)
    } else {
        (Money::zero(), color.clone())
    };

    AllocationResult {
        child_id: member.child_id.clone(),
        name: member.name.clone(),
        class: member.class.clone(),
        parent,
        monthly_fee: fee,
        allocated,
        months_paid: round_two_decimals(months_paid),
        status,
        color,
        extras,
        extras_color,
    }
}
