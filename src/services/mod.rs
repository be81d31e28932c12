//! Service layer for the tuition ledger
//!
//! The service layer holds the payment logic: fee lookup, statement import,
//! payer matching, allocation, classification and the ledger projection and
//! writer. Services work on in-memory roster snapshots; persistence stays in
//! the storage layer.

pub mod allocation;
pub mod classifier;
pub mod fees;
pub mod grouping;
pub mod import;
pub mod matching;
pub mod payments;
pub mod prior;
pub mod projection;
pub mod report;
pub mod run;
pub mod writer;

pub use allocation::{Allocation, AllocationEngine, AllocationResult, GroupAllocation};
pub use classifier::{classify, PaymentStatus, StatusCategory};
pub use fees::{FeeLookup, FeeSchedule, FeeSource, FeeTier};
pub use grouping::{GroupMember, ParentGroup, ParentGroups};
pub use import::{ColumnMapping, ImportService, StatementImport};
pub use matching::{fill_missing_parents, PayerMatcher, SubstringMatcher};
pub use payments::{PaymentAggregation, PaymentService, PaymentTotals};
pub use prior::{prior_allocation, read_prior_state, PriorSource};
pub use projection::{plan, MarkingPlan, SkipReason};
pub use report::{PaymentReport, ReportRow, ReportTotals};
pub use run::{ChildChange, RunOutcome, RunReport, RunService};
pub use writer::{apply_plan, record_allocation};
