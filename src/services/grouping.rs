//! Parent-child grouping
//!
//! Siblings who share a parent are allocated together from the parent's
//! pooled payments. Groups keep the order in which their first child appears
//! in the roster, and members keep roster order within a group: the first
//! member is the one that receives the pooled remainder.

use std::collections::HashMap;

use crate::models::{Child, ChildId, ClassId, ParentName};

/// One child inside a parent group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub child_id: ChildId,
    pub name: String,
    pub class: ClassId,
}

impl GroupMember {
    pub fn new(child_id: impl Into<ChildId>, name: impl Into<String>, class: impl Into<ClassId>) -> Self {
        Self {
            child_id: child_id.into(),
            name: name.into(),
            class: class.into(),
        }
    }
}

impl From<&Child> for GroupMember {
    fn from(child: &Child) -> Self {
        Self {
            child_id: child.child_id.clone(),
            name: child.name.clone(),
            class: child.class.clone(),
        }
    }
}

/// Children sharing one parent
///
/// A group without a parent holds exactly one child whose parent could not be
/// determined; it is allocated on its own with no new payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentGroup {
    pub parent: Option<ParentName>,
    pub members: Vec<GroupMember>,
}

impl ParentGroup {
    pub fn new(parent: Option<ParentName>, members: Vec<GroupMember>) -> Self {
        Self { parent, members }
    }

    /// Whether siblings pool their payments
    pub fn is_pooled(&self) -> bool {
        self.members.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// All parent groups of a roster, in stable order
#[derive(Debug, Clone, Default)]
pub struct ParentGroups {
    groups: Vec<ParentGroup>,
}

impl ParentGroups {
    /// Group children by normalized parent name
    pub fn from_children<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a Child>,
    {
        let mut groups: Vec<ParentGroup> = Vec::new();
        let mut index: HashMap<ParentName, usize> = HashMap::new();

        for child in children {
            match child.parent() {
                Some(parent) => {
                    if let Some(&idx) = index.get(&parent) {
                        groups[idx].members.push(GroupMember::from(child));
                    } else {
                        index.insert(parent.clone(), groups.len());
                        groups.push(ParentGroup::new(Some(parent), vec![GroupMember::from(child)]));
                    }
                }
                None => groups.push(ParentGroup::new(None, vec![GroupMember::from(child)])),
            }
        }

        Self { groups }
    }

    /// Build from pre-computed groups
    pub fn from_groups(groups: Vec<ParentGroup>) -> Self {
        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParentGroup> {
        self.groups.iter()
    }

    /// Groups with two or more children
    pub fn pooled(&self) -> impl Iterator<Item = &ParentGroup> {
        self.groups.iter().filter(|group| group.is_pooled())
    }

    /// Normalized parents, in group order
    pub fn parents(&self) -> Vec<ParentName> {
        self.groups
            .iter()
            .filter_map(|group| group.parent.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
