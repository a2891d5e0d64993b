//! The registry facade: the single synchronised entry point for hosts.
//!
//! [`PluginRegistry`] is the capability surface consumers program against.
//! It is sealed, so [`Registry`] is its only implementation. A registry
//! combines the creator table, the loaded-library table, the parent-search
//! policy, and the error recorder link.
//!
//! # Thread safety
//!
//! | Operation | Guarantee |
//! |---|---|
//! | `register_creator`, `get_plugin_creator`, `deregister_creator*` | serialised by the registry mutex |
//! | `load_library`, `deregister_library` | serialised by the registry mutex |
//! | `get_plugin_creator_list` | a snapshot; concurrent mutation makes it stale, so callers needing a coherent view must not register or deregister while enumerating |
//! | `get_error_recorder` | safe |
//! | `set_error_recorder` | not meant to race with itself |
//! | `is_parent_search_enabled`, `set_parent_search_enabled` | not meant to race with each other |

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::creator::{CreatorRecord, PluginCreator};
use crate::error::RegistryError;
use crate::identity::{CreatorIdentity, check_lookup};
use crate::loader::{DylibLoader, LibraryHandle, ModuleLoader};
use crate::recorder::{ErrorCode, ErrorRecorder, RecorderLink};

mod global;
mod state;

pub use self::global::global_registry;
use self::state::{LoadedLibrary, RegistryState, StagedRegistration};

mod sealed {
    pub trait Sealed {}
}

/// Registration, discovery, and lifecycle of plugin creators.
///
/// Every recoverable failure is reported through the return value; no
/// operation panics or aborts. Diagnostic detail is forwarded to the error
/// recorder when one is set.
pub trait PluginRegistry: sealed::Sealed + Send + Sync {
    /// Registers `creator` under `namespace`.
    ///
    /// The identity is `(creator.name(), creator.version(), namespace)`.
    /// Returns `false`, leaving the registry unchanged, if that identity is
    /// already registered or violates the identity contract.
    #[must_use = "a false return means the creator was not registered"]
    fn register_creator(&self, creator: Arc<dyn PluginCreator>, namespace: &str) -> bool;

    /// Returns every registered creator in registration order.
    ///
    /// Not synchronised with concurrent registration: see the module-level
    /// thread-safety table.
    fn get_plugin_creator_list(&self) -> Vec<CreatorRecord>;

    /// Looks up a creator by exact identity, consulting the parent registry
    /// on a local miss when parent search is enabled.
    fn get_plugin_creator(
        &self,
        name: &str,
        version: &str,
        namespace: &str,
    ) -> Option<Arc<dyn PluginCreator>>;

    /// Removes the creator registered under `identity`.
    ///
    /// Returns `false` if no such creator is registered here.
    fn deregister_creator(&self, identity: &CreatorIdentity) -> bool;

    /// Removes the record holding exactly `creator`.
    ///
    /// Returns `false` if that object is not registered here.
    fn deregister_creator_instance(&self, creator: &dyn PluginCreator) -> bool;

    /// Replaces the error recorder, acquiring the new one and releasing the
    /// previous one. `None` empties the slot.
    fn set_error_recorder(&self, recorder: Option<Arc<dyn ErrorRecorder>>);

    /// Returns the error recorder last set, if any.
    fn get_error_recorder(&self) -> Option<Arc<dyn ErrorRecorder>>;

    /// Returns whether local misses are forwarded to the parent registry.
    fn is_parent_search_enabled(&self) -> bool;

    /// Sets whether local misses are forwarded to the parent registry.
    fn set_parent_search_enabled(&self, enabled: bool);

    /// Loads the plugin library at `path` and registers its creators.
    ///
    /// Returns `None` if the library cannot be loaded or any of its creators
    /// conflicts with a registered one; in that case none of its creators
    /// remain registered.
    #[must_use = "the handle is needed to deregister the library"]
    fn load_library(&self, path: &Path) -> Option<LibraryHandle>;

    /// Deregisters every creator contributed by `handle`, then releases the
    /// library. Unknown handles are ignored.
    fn deregister_library(&self, handle: LibraryHandle);
}

/// The registry implementation.
///
/// # Example
///
/// ```
/// use plugin_registry::{PluginRegistry, Registry};
/// # use plugin_registry::{PluginCreator, PluginField, PluginObject};
/// # use std::sync::Arc;
/// # struct Foo;
/// # impl PluginCreator for Foo {
/// #     fn name(&self) -> &str { "Foo" }
/// #     fn version(&self) -> &str { "1" }
/// #     fn create_plugin(&self, _: &str, _: &[PluginField]) -> Option<Box<dyn PluginObject>> { None }
/// #     fn deserialize_plugin(&self, _: &str, _: &[u8]) -> Option<Box<dyn PluginObject>> { None }
/// # }
///
/// let registry = Registry::new();
/// assert!(registry.register_creator(Arc::new(Foo), "ns"));
/// assert!(!registry.register_creator(Arc::new(Foo), "ns"));
/// assert!(registry.get_plugin_creator("Foo", "1", "ns").is_some());
/// ```
pub struct Registry {
    state: Mutex<RegistryState>,
    recorder: RecorderLink,
    parent_search: AtomicBool,
    parent: Option<Arc<dyn PluginRegistry>>,
    loader: Box<dyn ModuleLoader>,
}

impl sealed::Sealed for Registry {}

impl Registry {
    /// Creates an empty registry that loads libraries with [`DylibLoader`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            recorder: RecorderLink::new(),
            parent_search: AtomicBool::new(true),
            parent: None,
            loader: Box::new(DylibLoader),
        }
    }

    /// Makes `parent` the registry consulted on local lookup misses.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<dyn PluginRegistry>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Replaces the module loader used by [`PluginRegistry::load_library`].
    #[must_use]
    pub fn with_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Looks up a creator registered in the empty namespace.
    #[must_use]
    pub fn get_plugin_creator_default(
        &self,
        name: &str,
        version: &str,
    ) -> Option<Arc<dyn PluginCreator>> {
        self.get_plugin_creator(name, version, "")
    }

    /// Registers `creator`, reporting why registration failed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractViolation`] for identities outside the
    /// boundary contract and [`RegistryError::Conflict`] for duplicates.
    pub fn try_register_creator(
        &self,
        creator: Arc<dyn PluginCreator>,
        namespace: &str,
    ) -> Result<(), RegistryError> {
        let identity = CreatorIdentity::new(creator.name(), creator.version(), namespace);
        identity.validate()?;
        self.lock_state()
            .creators
            .insert(CreatorRecord::new(identity.clone(), creator, None))?;
        debug!(
            name = identity.name(),
            version = identity.version(),
            namespace = identity.namespace(),
            "registered plugin creator"
        );
        Ok(())
    }

    /// Loads the library at `path`, reporting why loading failed.
    ///
    /// The module is opened outside the registry lock. Its entry point then
    /// runs under the lock; if any registration fails, every creator the
    /// entry point added is removed again before the module is released.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the module cannot be opened, and
    /// [`RegistryError::RegistrationConflict`] or
    /// [`RegistryError::ContractViolation`] if one of its creators cannot be
    /// registered.
    pub fn try_load_library(&self, path: &Path) -> Result<LibraryHandle, RegistryError> {
        let module = self.loader.open(path)?;

        let mut state = self.lock_state();
        let handle = state.allocate_handle();
        let mut staged = StagedRegistration::new(&mut state.creators, handle);
        let panicked = panic::catch_unwind(AssertUnwindSafe(|| module.register(&mut staged))).is_err();
        let contributed = match staged.finish(path, panicked) {
            Ok(contributed) => contributed,
            Err(error) => {
                drop(state);
                drop(module);
                return Err(error);
            }
        };

        debug!(
            path = %path.display(),
            %handle,
            creators = contributed.len(),
            "loaded plugin library"
        );
        state.libraries.insert(
            handle,
            LoadedLibrary::new(path.to_path_buf(), contributed, module),
        );
        Ok(handle)
    }

    /// Removes the creator registered under `identity` and returns its record.
    ///
    /// A creator contributed by a library is also dropped from that library's
    /// contributed set, so deregistering the library later leaves it alone.
    /// The library still counts the creator as outstanding while a caller
    /// holds it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no such creator is registered.
    pub fn try_deregister_creator(
        &self,
        identity: &CreatorIdentity,
    ) -> Result<CreatorRecord, RegistryError> {
        let removed = self.lock_state().remove_creator(identity);
        let record = removed.ok_or_else(|| RegistryError::NotFound {
            identity: identity.clone(),
        })?;
        debug!(
            name = identity.name(),
            version = identity.version(),
            namespace = identity.namespace(),
            "deregistered plugin creator"
        );
        Ok(record)
    }

    /// Returns the identities `handle` still contributes, or `None` if the
    /// handle is not tracked.
    #[must_use]
    pub fn library_creators(&self, handle: LibraryHandle) -> Option<Vec<CreatorIdentity>> {
        self.lock_state().libraries.get(&handle).map(|library| {
            library
                .contributed
                .iter()
                .map(|record| record.identity().clone())
                .collect()
        })
    }

    /// Returns the number of libraries currently loaded.
    #[must_use]
    pub fn library_count(&self) -> usize {
        self.lock_state().libraries.len()
    }

    /// Returns the number of registered creators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().creators.len()
    }

    /// Returns `true` when no creators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().creators.is_empty()
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn diagnose(&self, error: &RegistryError) {
        warn!(%error, "plugin registry operation failed");
        self.recorder.report(error.error_code(), &error.to_string());
    }

    fn remove_record(&self, identity: &CreatorIdentity) -> bool {
        match self.try_deregister_creator(identity) {
            Ok(_) => true,
            Err(error) => {
                debug!(%error, "deregistration ignored");
                false
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry for Registry {
    fn register_creator(&self, creator: Arc<dyn PluginCreator>, namespace: &str) -> bool {
        match self.try_register_creator(creator, namespace) {
            Ok(()) => true,
            Err(error) => {
                self.diagnose(&error);
                false
            }
        }
    }

    fn get_plugin_creator_list(&self) -> Vec<CreatorRecord> {
        self.lock_state().creators.records()
    }

    fn get_plugin_creator(
        &self,
        name: &str,
        version: &str,
        namespace: &str,
    ) -> Option<Arc<dyn PluginCreator>> {
        if let Err(error) = check_lookup(name, version, namespace) {
            self.diagnose(&error);
            return None;
        }
        let local = self
            .lock_state()
            .creators
            .find(name, version, namespace)
            .map(|record| Arc::clone(record.creator()));
        if local.is_some() {
            return local;
        }
        match self.parent.as_ref() {
            Some(parent) if self.is_parent_search_enabled() => {
                parent.get_plugin_creator(name, version, namespace)
            }
            _ => None,
        }
    }

    fn deregister_creator(&self, identity: &CreatorIdentity) -> bool {
        self.remove_record(identity)
    }

    fn deregister_creator_instance(&self, creator: &dyn PluginCreator) -> bool {
        let mut state = self.lock_state();
        let identity = state
            .creators
            .find_instance(creator)
            .map(|record| record.identity().clone());
        let removed = identity.and_then(|found| state.remove_creator(&found));
        drop(state);
        match removed {
            Some(record) => {
                debug!(identity = %record.identity(), "deregistered plugin creator instance");
                true
            }
            None => {
                debug!("deregistration of unregistered creator instance ignored");
                false
            }
        }
    }

    fn set_error_recorder(&self, recorder: Option<Arc<dyn ErrorRecorder>>) {
        self.recorder.set(recorder);
    }

    fn get_error_recorder(&self) -> Option<Arc<dyn ErrorRecorder>> {
        self.recorder.get()
    }

    fn is_parent_search_enabled(&self) -> bool {
        self.parent_search.load(Ordering::Relaxed)
    }

    fn set_parent_search_enabled(&self, enabled: bool) {
        self.parent_search.store(enabled, Ordering::Relaxed);
    }

    fn load_library(&self, path: &Path) -> Option<LibraryHandle> {
        match self.try_load_library(path) {
            Ok(handle) => Some(handle),
            Err(error) => {
                self.diagnose(&error);
                None
            }
        }
    }

    fn deregister_library(&self, handle: LibraryHandle) {
        let mut state = self.lock_state();
        let Some(mut library) = state.libraries.remove(&handle) else {
            debug!(%handle, "deregistration of unknown plugin library ignored");
            return;
        };
        for record in &library.contributed {
            state.creators.remove(record.identity());
        }
        drop(state);

        let outstanding = library.release_creators();
        if outstanding == 0 {
            debug!(path = %library.path.display(), %handle, "unloaded plugin library");
            drop(library);
            return;
        }

        let message = format!(
            "plugin library '{}' still has {outstanding} creator(s) in use; unloading is deferred until the registry is dropped",
            library.path.display()
        );
        warn!(path = %library.path.display(), %handle, outstanding, "{message}");
        self.recorder.report(ErrorCode::InvalidState, &message);
        self.lock_state().retired.push(library);
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let creators = state.creators.drain();
        let libraries: Vec<LoadedLibrary> = state.libraries.drain().map(|(_, library)| library).collect();
        let retired = std::mem::take(&mut state.retired);
        debug!(
            creators = creators.len(),
            libraries = libraries.len(),
            retired = retired.len(),
            "tearing down plugin registry"
        );
        drop(creators);
        for library in libraries.into_iter().chain(retired) {
            let path = library.path.clone();
            let outstanding = library.unload();
            if outstanding > 0 {
                warn!(
                    path = %path.display(),
                    outstanding,
                    "plugin library creators outlive the registry; the library stays mapped"
                );
            }
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("Registry")
            .field("creators", &state.creators.len())
            .field("libraries", &state.libraries.len())
            .field("parent_search", &self.is_parent_search_enabled())
            .field("has_parent", &self.parent.is_some())
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}
