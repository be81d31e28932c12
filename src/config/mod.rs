//! Configuration module for the tuition ledger
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - User settings persistence (fee schedule, run policies, logging)

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{FeeScheduleSettings, OverlapResolution, RunMode, Settings};
