//! The set of read groups still waiting for records.
//!
//! [`GroupTable`] maps read names to open [`ReadGroup`]s and keeps a companion set of the names
//! that are still incomplete. The two are always updated together. [`SharedGroupTable`] wraps the
//! table for the consumer thread and hands out snapshots to anyone else, such as the mate
//! recovery pass.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::read_group::ReadGroup;

/// Open read groups keyed by read name.
#[derive(Debug, Default)]
pub struct GroupTable {
    groups: AHashMap<String, ReadGroup>,
    incomplete_names: AHashSet<String>,
}

impl GroupTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no group is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns `true` if a group is open for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// The open group for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReadGroup> {
        self.groups.get(name)
    }

    /// Returns the group for `name`, opening an empty one if none exists.
    pub fn open(&mut self, name: &str) -> &mut ReadGroup {
        if !self.groups.contains_key(name) {
            self.incomplete_names.insert(name.to_string());
        }
        self.groups.entry(name.to_string()).or_insert_with(|| ReadGroup::new(name))
    }

    /// Removes and returns the group for `name`.
    pub fn remove(&mut self, name: &str) -> Option<ReadGroup> {
        self.incomplete_names.remove(name);
        self.groups.remove(name)
    }

    /// Removes every open group, ordered by read name.
    pub fn drain(&mut self) -> Vec<ReadGroup> {
        self.incomplete_names.clear();
        let mut groups: Vec<ReadGroup> = self.groups.drain().map(|(_, group)| group).collect();
        groups.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        groups
    }

    /// Names of the groups that are still incomplete.
    #[must_use]
    pub fn incomplete_names(&self) -> &AHashSet<String> {
        &self.incomplete_names
    }

    /// Returns `true` if the incomplete-name set matches the map's keys exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.groups.len() == self.incomplete_names.len()
            && self.groups.keys().all(|name| self.incomplete_names.contains(name))
    }
}

/// A [`GroupTable`] shared between the consumer thread and observers.
///
/// Only the consumer writes. Other threads read through [`snapshot`](Self::snapshot) and
/// [`incomplete_names`](Self::incomplete_names), which copy the state out under a read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedGroupTable {
    inner: Arc<RwLock<GroupTable>>,
}

impl SharedGroupTable {
    /// Creates an empty shared table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a read lock on the table.
    pub fn read(&self) -> RwLockReadGuard<'_, GroupTable> {
        self.inner.read()
    }

    /// Acquires a write lock on the table.
    pub fn write(&self) -> RwLockWriteGuard<'_, GroupTable> {
        self.inner.write()
    }

    /// Copies the open groups out of the table.
    #[must_use]
    pub fn snapshot(&self) -> AHashMap<String, ReadGroup> {
        self.inner.read().groups.clone()
    }

    /// Copies the incomplete-name set out of the table.
    #[must_use]
    pub fn incomplete_names(&self) -> AHashSet<String> {
        self.inner.read().incomplete_names.clone()
    }

    /// Number of open groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no group is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
