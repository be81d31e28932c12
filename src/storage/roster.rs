//! Roster repository for JSON storage
//!
//! The roster file holds the ledger window, every child with its month cells
//! and recorded allocation, and the statement records already applied.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::settings::RunMode;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Child, ChildId, ImportId, LedgerWindow, ParentName};

use super::file_io::{read_json_required, write_json_atomic};

fn default_schema_version() -> u32 {
    1
}

/// Serializable roster and ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Month columns carried by the ledger
    #[serde(default)]
    pub window: LedgerWindow,

    /// Children in roster order
    #[serde(default)]
    pub children: Vec<Child>,

    /// Statement records already allocated by earlier runs
    #[serde(default)]
    pub applied_imports: BTreeSet<ImportId>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(LedgerWindow::default())
    }
}

impl Roster {
    /// Create an empty roster
    pub fn new(window: LedgerWindow) -> Self {
        Self {
            schema_version: default_schema_version(),
            window,
            children: Vec::new(),
            applied_imports: BTreeSet::new(),
        }
    }

    /// Add a child, rejecting duplicate ids
    pub fn add_child(&mut self, child: Child) -> LedgerResult<()> {
        if self.get(&child.child_id).is_some() {
            return Err(LedgerError::duplicate_child(child.child_id.as_str()));
        }
        self.children.push(child);
        Ok(())
    }

    /// Get a child by id
    pub fn get(&self, id: &ChildId) -> Option<&Child> {
        self.children.iter().find(|c| &c.child_id == id)
    }

    /// Get a child by id for modification
    pub fn get_mut(&mut self, id: &ChildId) -> Option<&mut Child> {
        self.children.iter_mut().find(|c| &c.child_id == id)
    }

    /// Normalized parents of the roster, first appearance first
    pub fn parents(&self) -> Vec<ParentName> {
        let mut seen = HashSet::new();
        self.children
            .iter()
            .filter_map(Child::parent)
            .filter(|parent| seen.insert(parent.clone()))
            .collect()
    }

    /// Extend the ledger to the two-year window
    ///
    /// Returns true if the window changed.
    pub fn extend_window(&mut self) -> bool {
        let target = LedgerWindow::TwoYear;
        let changed = self.window != target;
        if changed {
            info!(from = %self.window, to = %target, "Extending ledger window");
            self.window = target;
        }
        for child in &mut self.children {
            child.widen_to(target.len());
        }
        changed
    }

    /// Children a run processes
    ///
    /// Processing stops at the first child without an id; rows after it are
    /// carried through untouched. Test mode further limits the run to the
    /// first `test_limit` children.
    pub fn processing_range(&self, mode: RunMode, test_limit: usize) -> Range<usize> {
        let end = self
            .children
            .iter()
            .position(|child| child.child_id.is_empty())
            .unwrap_or(self.children.len());

        match mode {
            RunMode::Production => 0..end,
            RunMode::Test => 0..end.min(test_limit),
        }
    }

    /// Check the children a run would process
    pub fn validate(&self, range: Range<usize>) -> LedgerResult<()> {
        let mut ids = HashSet::new();
        for child in &self.children[range] {
            child
                .validate()
                .map_err(|e| LedgerError::Roster(e.to_string()))?;
            if !ids.insert(child.child_id.clone()) {
                return Err(LedgerError::duplicate_child(child.child_id.as_str()));
            }
        }
        Ok(())
    }
}

/// Repository for roster persistence
pub struct RosterRepository {
    path: PathBuf,
}

impl RosterRepository {
    /// Create a new roster repository
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the roster; a missing file is an error
    pub fn load(&self) -> LedgerResult<Roster> {
        let roster: Roster = read_json_required(&self.path)?;
        if roster.schema_version > default_schema_version() {
            return Err(LedgerError::Roster(format!(
                "Unsupported roster schema version {}",
                roster.schema_version
            )));
        }
        Ok(roster)
    }

    /// Save the roster atomically
    pub fn save(&self, roster: &Roster) -> LedgerResult<()> {
        write_json_atomic(&self.path, roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorCode, LedgerCell, Money, MonthToken};
    use tempfile::TempDir;

    fn sample_roster() -> Roster {
        let mut roster = Roster::new(LedgerWindow::OneAndHalfYear);
        roster
            .add_child(Child::new("1", "Haddad Lina", "A5", Some("Karim Haddad")))
            .unwrap();
        roster
            .add_child(Child::new("2", "Haddad Sami", "B0", Some("KARIM HADDAD (0612)")))
            .unwrap();
        roster
            .add_child(Child::new("3", "Benali Yanis", "B1", Some("Nadia Benali")))
            .unwrap();
        roster
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let mut roster = sample_roster();
        let err = roster
            .add_child(Child::new("1", "Someone Else", "A6", None))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
    }

    #[test]
    fn test_parents_are_distinct() {
        let roster = sample_roster();
        let parents: Vec<_> = roster.parents().iter().map(|p| p.as_str().to_string()).collect();
        assert_eq!(parents, vec!["Karim Haddad", "Nadia Benali"]);
    }

    #[test]
    fn test_extend_window_widens_rows() {
        let mut roster = sample_roster();
        assert!(roster.extend_window());
        assert_eq!(roster.window, LedgerWindow::TwoYear);
        assert!(roster.children.iter().all(|c| c.cells.len() == 24));
        assert!(!roster.extend_window());
    }

    #[test]
    fn test_processing_range_stops_at_blank_id() {
        let mut roster = sample_roster();
        roster.children.insert(2, Child::new("", "Notes row", "", None));

        assert_eq!(roster.processing_range(RunMode::Production, 100), 0..2);
        assert_eq!(roster.processing_range(RunMode::Test, 1), 0..1);
    }

    #[test]
    fn test_validate_rejects_negative_allocation() {
        let mut roster = sample_roster();
        roster.children[0].allocated = Money::from_cents(-5);
        assert!(roster.validate(0..3).is_err());
        assert!(roster.validate(1..3).is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RosterRepository::new(temp_dir.path().join("roster.json"));

        let mut roster = sample_roster();
        roster.children[0].set_cell(
            MonthToken::at(0).unwrap(),
            LedgerCell::amount(Money::from_euros(25), ColorCode::fully_paid()),
        );
        roster.applied_imports.insert(ImportId::new("imp-0000000000000001"));
        repo.save(&roster).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.children.len(), 3);
        assert_eq!(loaded.window, LedgerWindow::OneAndHalfYear);
        assert_eq!(loaded.children[0].cells[0].text(), Some("25"));
        assert_eq!(loaded.applied_imports.len(), 1);
    }

    #[test]
    fn test_missing_roster_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = RosterRepository::new(temp_dir.path().join("missing.json"));
        assert!(repo.load().is_err());
    }
}
