//! Payer matching
//!
//! Bank statements spell payers however the bank or the parent typed them.
//! A [`PayerMatcher`] maps a raw payer string onto one of the roster's
//! parents; the allocation engine only ever sees the resulting grouping.

use tracing::debug;

use crate::models::{Child, ParentName};

/// Minimum length a name needs before containment matching is trusted
const MIN_CONTAINMENT_LEN: usize = 4;

/// Maps a statement payer onto a roster parent
pub trait PayerMatcher {
    /// Best roster parent for `payer`, if any
    fn match_payer(&self, payer: &str, parents: &[ParentName]) -> Option<ParentName>;
}

/// Exact match first, then containment in either direction
///
/// Names are compared by their normalized lowercase key. Containment only
/// applies when both names are longer than three characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl PayerMatcher for SubstringMatcher {
    fn match_payer(&self, payer: &str, parents: &[ParentName]) -> Option<ParentName> {
        let payer = ParentName::normalize(payer)?;

        if let Some(exact) = parents.iter().find(|parent| **parent == payer) {
            return Some(exact.clone());
        }

        let payer_key = payer.key();
        if payer_key.chars().count() < MIN_CONTAINMENT_LEN {
            return None;
        }

        parents
            .iter()
            .filter(|parent| parent.key().chars().count() >= MIN_CONTAINMENT_LEN)
            .find(|parent| payer_key.contains(parent.key()) || parent.key().contains(payer_key))
            .cloned()
    }
}

/// Fill in missing parents from family names
///
/// A child without a parent gets the first known parent whose last word
/// equals the child's first word, looking at the roster's own parents before
/// the statement's payers. Returns the number of children updated.
pub fn fill_missing_parents(children: &mut [Child], payers: &[String]) -> usize {
    let roster_parents: Vec<ParentName> = children.iter().filter_map(Child::parent).collect();
    let payer_parents: Vec<ParentName> = payers
        .iter()
        .filter_map(|payer| ParentName::normalize(payer))
        .collect();

    let mut filled = 0;
    for child in children.iter_mut().filter(|c| c.parent().is_none()) {
        let Some(family) = child.first_word().map(str::to_lowercase) else {
            continue;
        };

        let found = roster_parents
            .iter()
            .chain(payer_parents.iter())
            .find(|parent| parent.last_word().to_lowercase() == family);

        if let Some(parent) = found {
            debug!(child = %child.child_id, parent = %parent, "Parent inferred from family name");
            child.parent_name = Some(parent.as_str().to_string());
            filled += 1;
        }
    }

    filled
}
