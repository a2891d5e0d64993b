//! Mutable state guarded by the registry mutex.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::creator::{CreatorRecord, PluginCreator};
use crate::error::RegistryError;
use crate::identity::CreatorIdentity;
use crate::loader::{CreatorSink, LibraryHandle, PluginModule};
use crate::table::CreatorTable;

/// Everything the registry mutex protects.
#[derive(Default)]
pub(super) struct RegistryState {
    pub(super) creators: CreatorTable,
    pub(super) libraries: HashMap<LibraryHandle, LoadedLibrary>,
    /// Libraries whose creators were still referenced when deregistered.
    pub(super) retired: Vec<LoadedLibrary>,
    issued_handles: u64,
}

impl RegistryState {
    pub(super) fn allocate_handle(&mut self) -> LibraryHandle {
        let handle = LibraryHandle::new(NonZeroU64::MIN.saturating_add(self.issued_handles));
        self.issued_handles += 1;
        handle
    }

    /// Removes the record under `identity` and drops it from the contributed
    /// set of the library that owns it.
    pub(super) fn remove_creator(&mut self, identity: &CreatorIdentity) -> Option<CreatorRecord> {
        let record = self.creators.remove(identity)?;
        if let Some(loaded) = record
            .library()
            .and_then(|library| self.libraries.get_mut(&library))
        {
            loaded
                .contributed
                .retain(|kept| kept.identity() != identity);
        }
        Some(record)
    }
}

/// A library that loaded successfully and the creators it still contributes.
pub(super) struct LoadedLibrary {
    pub(super) path: PathBuf,
    // Declared before `module` so the creators drop while their code is
    // still mapped.
    pub(super) contributed: Vec<CreatorRecord>,
    /// Every creator the library ever contributed, including ones
    /// deregistered individually since.
    issued: Vec<Weak<dyn PluginCreator>>,
    module: Box<dyn PluginModule>,
}

impl LoadedLibrary {
    pub(super) fn new(
        path: PathBuf,
        contributed: Vec<CreatorRecord>,
        module: Box<dyn PluginModule>,
    ) -> Self {
        let issued = contributed
            .iter()
            .map(|record| Arc::downgrade(record.creator()))
            .collect();
        Self {
            path,
            contributed,
            issued,
            module,
        }
    }

    /// Drops this library's references to its creators and returns how many
    /// of the creators it issued are still alive elsewhere.
    pub(super) fn release_creators(&mut self) -> usize {
        self.contributed.clear();
        self.issued
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Releases the library and returns the number of creators still alive.
    ///
    /// The module is unmapped only when that number is zero; otherwise it is
    /// leaked for the rest of the process.
    pub(super) fn unload(mut self) -> usize {
        let outstanding = self.release_creators();
        if outstanding > 0 {
            std::mem::forget(self.module);
        }
        outstanding
    }
}

/// Sink handed to a library's entry point while the registry lock is held.
///
/// Creators are inserted immediately and remembered, so a failure later in
/// the same load can roll every one of them back.
pub(super) struct StagedRegistration<'a> {
    table: &'a mut CreatorTable,
    handle: LibraryHandle,
    added: Vec<CreatorRecord>,
    failure: Option<RegistryError>,
}

impl<'a> StagedRegistration<'a> {
    pub(super) fn new(table: &'a mut CreatorTable, handle: LibraryHandle) -> Self {
        Self {
            table,
            handle,
            added: Vec::new(),
            failure: None,
        }
    }

    /// Commits the staged creators, or rolls them back if any registration
    /// failed or the entry point panicked.
    pub(super) fn finish(
        self,
        path: &Path,
        panicked: bool,
    ) -> Result<Vec<CreatorRecord>, RegistryError> {
        let Self {
            table,
            added,
            failure: staged_failure,
            ..
        } = self;
        let failure = if panicked {
            Some(RegistryError::load_failure(
                path,
                "the library entry point panicked",
            ))
        } else {
            staged_failure.map(|error| match error {
                RegistryError::Conflict { identity } => RegistryError::RegistrationConflict {
                    path: path.to_path_buf(),
                    identity,
                },
                other => other,
            })
        };

        match failure {
            None => Ok(added),
            Some(error) => {
                for record in &added {
                    table.remove(record.identity());
                }
                Err(error)
            }
        }
    }
}

impl CreatorSink for StagedRegistration<'_> {
    fn register_creator(&mut self, creator: Arc<dyn PluginCreator>, namespace: &str) -> bool {
        if self.failure.is_some() {
            return false;
        }
        let identity = CreatorIdentity::new(creator.name(), creator.version(), namespace);
        let record = CreatorRecord::new(identity, creator, Some(self.handle));
        match record
            .identity()
            .validate()
            .and_then(|()| self.table.insert(record.clone()))
        {
            Ok(()) => {
                self.added.push(record);
                true
            }
            Err(error) => {
                self.failure = Some(error);
                false
            }
        }
    }
}
