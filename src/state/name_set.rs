//! # Object Name Set
//!
//! Ordered set of [`ObjectName`]s. Used as the value type inside the relational
//! indexes and, behind a lock, for the overdue and revoked certificate sets.

use super::ObjectName;
use serde::Serialize;
use std::collections::btree_set::{self, BTreeSet};

/// Mutable set of object names.
///
/// Iteration order is the `ObjectName` ordering, so enumeration is stable
/// for a given set of members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObjectNameSet {
    names: BTreeSet<ObjectName>,
}

impl ObjectNameSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name. Returns `true` if it was not present before.
    pub fn insert(&mut self, name: ObjectName) -> bool {
        self.names.insert(name)
    }

    /// Removes a name. Returns `true` if it was present.
    pub fn remove(&mut self, name: &ObjectName) -> bool {
        self.names.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &ObjectName) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ObjectName> {
        self.names.iter()
    }

    /// Snapshot of the members in set order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ObjectName> {
        self.names.iter().cloned().collect()
    }
}

impl FromIterator<ObjectName> for ObjectNameSet {
    fn from_iter<I: IntoIterator<Item = ObjectName>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

impl Extend<ObjectName> for ObjectNameSet {
    fn extend<I: IntoIterator<Item = ObjectName>>(&mut self, iter: I) {
        self.names.extend(iter);
    }
}

impl IntoIterator for ObjectNameSet {
    type Item = ObjectName;
    type IntoIter = btree_set::IntoIter<ObjectName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl<'a> IntoIterator for &'a ObjectNameSet {
    type Item = &'a ObjectName;
    type IntoIter = btree_set::Iter<'a, ObjectName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
