//! In-memory modules for exercising library loading without a dynamic loader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{CreatorSink, ModuleLoader, PluginModule};
use crate::error::RegistryError;
use crate::test_support::StubCreator;

#[derive(Debug, Clone)]
struct ModuleSpec {
    namespace: String,
    creators: Vec<(String, String)>,
    panics_after: Option<usize>,
}

/// Loader serving modules from a path-keyed table.
///
/// Each module builds fresh [`StubCreator`]s on every registration, so the
/// registry is their only holder once a load succeeds. The loader counts how
/// many of its modules are open so tests can assert that unloading happened.
/// Clones share the module table and the counter, so a test can keep one
/// clone after handing another to a registry.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    modules: Arc<Mutex<HashMap<PathBuf, ModuleSpec>>>,
    open_modules: Arc<AtomicUsize>,
}

impl StaticLoader {
    /// Creates a loader with no modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a module at `path` registering `(name, version)` creators
    /// under `namespace`, in order.
    pub fn add_module(&self, path: impl Into<PathBuf>, namespace: &str, creators: &[(&str, &str)]) {
        let spec = ModuleSpec {
            namespace: namespace.to_owned(),
            creators: creators
                .iter()
                .map(|(name, version)| ((*name).to_owned(), (*version).to_owned()))
                .collect(),
            panics_after: None,
        };
        self.insert(path.into(), spec);
    }

    /// Declares a module whose entry point registers its first
    /// `registered_before_panic` creators and then panics.
    pub fn add_panicking_module(
        &self,
        path: impl Into<PathBuf>,
        namespace: &str,
        creators: &[(&str, &str)],
        registered_before_panic: usize,
    ) {
        let spec = ModuleSpec {
            namespace: namespace.to_owned(),
            creators: creators
                .iter()
                .map(|(name, version)| ((*name).to_owned(), (*version).to_owned()))
                .collect(),
            panics_after: Some(registered_before_panic),
        };
        self.insert(path.into(), spec);
    }

    fn insert(&self, path: PathBuf, spec: ModuleSpec) {
        self.modules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, spec);
    }

    /// Returns the number of modules opened and not yet dropped.
    #[must_use]
    pub fn open_modules(&self) -> usize {
        self.open_modules.load(Ordering::Acquire)
    }
}

impl ModuleLoader for StaticLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PluginModule>, RegistryError> {
        let spec = self
            .modules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::load_failure(path, "no such module"))?;
        self.open_modules.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(StaticModule {
            spec,
            open_modules: Arc::clone(&self.open_modules),
        }))
    }
}

struct StaticModule {
    spec: ModuleSpec,
    open_modules: Arc<AtomicUsize>,
}

impl PluginModule for StaticModule {
    fn register(&self, sink: &mut dyn CreatorSink) {
        for (position, (name, version)) in self.spec.creators.iter().enumerate() {
            if self.spec.panics_after == Some(position) {
                panic!("module entry point failed after {position} registrations");
            }
            if !sink.register_creator(StubCreator::shared(name.as_str(), version.as_str()), &self.spec.namespace) {
                break;
            }
        }
    }
}

impl Drop for StaticModule {
    fn drop(&mut self) {
        self.open_modules.fetch_sub(1, Ordering::AcqRel);
    }
}
