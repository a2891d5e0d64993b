//! Authoritative identity table of live creator records.
//!
//! [`CreatorTable`] enforces identity uniqueness and preserves registration
//! order for enumeration. It performs no locking of its own; the
//! [`Registry`](crate::Registry) keeps it behind the registry mutex.

use std::collections::HashMap;

use crate::creator::{CreatorRecord, PluginCreator};
use crate::error::RegistryError;
use crate::identity::CreatorIdentity;

#[derive(Debug)]
struct Entry {
    sequence: u64,
    record: CreatorRecord,
}

/// Map from [`CreatorIdentity`] to [`CreatorRecord`].
#[derive(Debug, Default)]
pub struct CreatorTable {
    entries: HashMap<CreatorIdentity, Entry>,
    next_sequence: u64,
}

impl CreatorTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record unless its identity is already present.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] and leaves the table untouched when
    /// a record with the same identity exists.
    pub fn insert(&mut self, record: CreatorRecord) -> Result<(), RegistryError> {
        if self.entries.contains_key(record.identity()) {
            return Err(RegistryError::Conflict {
                identity: record.identity().clone(),
            });
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries
            .insert(record.identity().clone(), Entry { sequence, record });
        Ok(())
    }

    /// Looks up a record by exact identity.
    #[must_use]
    pub fn get(&self, identity: &CreatorIdentity) -> Option<&CreatorRecord> {
        self.entries.get(identity).map(|entry| &entry.record)
    }

    /// Looks up a record by its identity fields without allocating a key.
    #[must_use]
    pub fn find(&self, name: &str, version: &str, namespace: &str) -> Option<&CreatorRecord> {
        self.entries
            .iter()
            .find(|(identity, _)| identity.matches(name, version, namespace))
            .map(|(_, entry)| &entry.record)
    }

    /// Finds the record holding exactly `creator`.
    #[must_use]
    pub fn find_instance(&self, creator: &dyn PluginCreator) -> Option<&CreatorRecord> {
        self.entries
            .values()
            .map(|entry| &entry.record)
            .find(|record| record.holds(creator))
    }

    /// Removes and returns the record with the given identity.
    pub fn remove(&mut self, identity: &CreatorIdentity) -> Option<CreatorRecord> {
        self.entries.remove(identity).map(|entry| entry.record)
    }

    /// Returns every record in registration order.
    #[must_use]
    pub fn records(&self) -> Vec<CreatorRecord> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries.into_iter().map(|entry| entry.record.clone()).collect()
    }

    /// Removes every record, returning them in registration order.
    pub fn drain(&mut self) -> Vec<CreatorRecord> {
        let mut entries: Vec<Entry> = self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries.into_iter().map(|entry| entry.record).collect()
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no records are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests;
