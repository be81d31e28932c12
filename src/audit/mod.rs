//! Audit logging for allocation runs
//!
//! Records every run and each child allocation it changed, with before/after
//! snapshots, in an append-only JSONL log.
//!
//! # Example
//!
//! ```rust,ignore
//! use tuition_ledger::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log_batch(&AuditEntry::for_run(&outcome.report))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::change_summary;
pub use entry::{AllocationSnapshot, AuditEntry, EntryKind};
pub use logger::AuditLogger;
