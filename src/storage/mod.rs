//! Storage layer for the tuition ledger
//!
//! Provides JSON file storage with atomic writes for the roster and ledger.

pub mod file_io;
pub mod roster;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use roster::{Roster, RosterRepository};
