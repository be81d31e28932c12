//! Tuition ledger - tuition payment allocation for a small school
//!
//! This library reconciles parents' bank transfers against a class roster.
//! Payments of siblings are pooled per parent, split into whole months at
//! each child's class fee, classified into a payment status, and projected
//! onto a month-by-month ledger.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, months, children, ledger cells, payments)
//! - `storage`: JSON roster storage
//! - `services`: Fee schedule, allocation, classification, projection and runs
//! - `audit`: Audit logging of runs
//! - `export`: CSV, JSON and YAML exports
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//! - `telemetry`: Logging setup
//!
//! # Example
//!
//! ```rust,ignore
//! use tuition_ledger::config::{paths::LedgerPaths, settings::Settings};
//! use tuition_ledger::services::{FeeSchedule, RunService};
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let fees = FeeSchedule::new(&settings.fees)?;
//! let outcome = RunService::new(&settings, &fees).execute(&roster, &records, settings.run_mode)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;

pub use error::{LedgerError, LedgerResult};
