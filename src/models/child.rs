//! Child model
//!
//! One roster row: an enrolled child, its class, a weak link to its parent by
//! name, the allocation recorded by the previous run and the month cells.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ChildId, ClassId};
use super::ledger::LedgerCell;
use super::money::Money;
use super::month::MonthToken;
use super::parent::ParentName;

/// An enrolled child
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    /// Roster key
    pub child_id: ChildId,

    /// Display name
    pub name: String,

    /// Class code, drives the monthly fee
    pub class: ClassId,

    /// Parent as written in the roster (may include a phone number)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    /// Contact number split off the parent column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Cumulative amount allocated to this child by the previous run
    #[serde(default)]
    pub allocated: Money,

    /// Month cells, one per window position
    #[serde(default)]
    pub cells: Vec<LedgerCell>,
}

impl Child {
    /// Create a child with an empty ledger row
    pub fn new(
        child_id: impl Into<ChildId>,
        name: impl Into<String>,
        class: impl Into<ClassId>,
        parent_name: Option<&str>,
    ) -> Self {
        Self {
            child_id: child_id.into(),
            name: name.into(),
            class: class.into(),
            parent_name: parent_name.map(str::to_string),
            phone: None,
            allocated: Money::zero(),
            cells: Vec::new(),
        }
    }

    /// Normalized parent, if the roster names one
    pub fn parent(&self) -> Option<ParentName> {
        self.parent_name.as_deref().and_then(ParentName::normalize)
    }

    /// First word of the child's name (family name in roster convention)
    pub fn first_word(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }

    /// Cell for a month, if the row is wide enough
    pub fn cell(&self, month: MonthToken) -> Option<&LedgerCell> {
        self.cells.get(month.index())
    }

    /// Overwrite the cell for a month, widening the row if needed
    pub fn set_cell(&mut self, month: MonthToken, cell: LedgerCell) {
        if self.cells.len() <= month.index() {
            self.cells.resize(month.index() + 1, LedgerCell::default());
        }
        self.cells[month.index()] = cell;
    }

    /// Pad the row to `len` cells
    pub fn widen_to(&mut self, len: usize) {
        if self.cells.len() < len {
            self.cells.resize(len, LedgerCell::default());
        }
    }

    /// Move a parenthesised phone number out of the parent column
    pub fn split_parent_contact(&mut self) {
        let Some(raw) = self.parent_name.clone() else {
            return;
        };
        let (parent, contact) = ParentName::with_contact(&raw);
        if self.phone.is_none() {
            self.phone = contact;
        }
        self.parent_name = parent.map(|p| p.as_str().to_string());
    }

    /// Validate the child
    pub fn validate(&self) -> Result<(), ChildValidationError> {
        if self.child_id.is_empty() {
            return Err(ChildValidationError::EmptyId);
        }

        if self.name.trim().is_empty() {
            return Err(ChildValidationError::EmptyName(self.child_id.to_string()));
        }

        if self.allocated.is_negative() {
            return Err(ChildValidationError::NegativeAllocation(
                self.child_id.to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.child_id, self.class)
    }
}

/// Validation errors for children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildValidationError {
    EmptyId,
    EmptyName(String),
    NegativeAllocation(String),
}

impl fmt::Display for ChildValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Child id cannot be empty"),
            Self::EmptyName(id) => write!(f, "Child {} has no name", id),
            Self::NegativeAllocation(id) => {
                write!(f, "Child {} has a negative recorded allocation", id)
            }
        }
    }
}

impl std::error::Error for ChildValidationError {}
