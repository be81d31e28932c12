//! Core data models for the tuition ledger
//!
//! This module contains the data structures of the payment domain: money,
//! month tokens, ledger cells and colors, children, parents and bank
//! payment records.

pub mod child;
pub mod color;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod month;
pub mod parent;
pub mod payment;

pub use child::{Child, ChildValidationError};
pub use color::ColorCode;
pub use ids::{ChildId, ClassId, ImportId, RunId};
pub use ledger::{LedgerCell, PriorLedgerState};
pub use money::Money;
pub use month::{LedgerWindow, MonthToken, FULL_WINDOW_LEN, MONTH_LABELS};
pub use parent::ParentName;
pub use payment::{coerce_amount, AmountIssue, PaymentRecord};
