//! [`ModuleLoader`] backed by the operating system's dynamic loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::debug;

use super::{ABI_VERSION, ABI_VERSION_SYMBOL, CreatorSink, ENTRY_SYMBOL, EntryPoint};
use super::{ModuleLoader, PluginModule};
use crate::error::RegistryError;

/// Loads plugin libraries with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl ModuleLoader for DylibLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn PluginModule>, RegistryError> {
        // SAFETY: opening a library runs its initialisers. Callers only hand
        // in paths to plugin libraries built for this registry.
        let library = unsafe { Library::new(path) }.map_err(|source| {
            RegistryError::LoadFailure {
                path: path.to_path_buf(),
                message: String::from("the module could not be opened"),
                source: Some(Arc::new(source)),
            }
        })?;

        let found = read_abi_version(&library, path)?;
        if found != ABI_VERSION {
            return Err(RegistryError::AbiMismatch {
                path: path.to_path_buf(),
                expected: ABI_VERSION,
                found,
            });
        }

        // SAFETY: the ABI version matched, so the symbol has the
        // `EntryPoint` signature. The fn pointer is only used while `library`
        // stays loaded inside the returned module.
        let entry: EntryPoint = unsafe { library.get::<EntryPoint>(ENTRY_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|source| missing_symbol(path, ENTRY_SYMBOL, source))?;

        debug!(path = %path.display(), "opened plugin library");
        Ok(Box::new(DylibModule {
            entry,
            path: path.to_path_buf(),
            library,
        }))
    }
}

fn read_abi_version(library: &Library, path: &Path) -> Result<u32, RegistryError> {
    // SAFETY: the symbol is declared as a `u32` static by
    // `declare_plugin_library!` and lives as long as `library`.
    unsafe {
        let symbol = library
            .get::<*const u32>(ABI_VERSION_SYMBOL)
            .map_err(|source| missing_symbol(path, ABI_VERSION_SYMBOL, source))?;
        let version: *const u32 = *symbol;
        if version.is_null() {
            return Err(RegistryError::load_failure(
                path,
                "ABI version symbol resolved to a null address",
            ));
        }
        Ok(version.read())
    }
}

fn missing_symbol(path: &Path, symbol: &[u8], source: libloading::Error) -> RegistryError {
    let name = String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol)).into_owned();
    RegistryError::LoadFailure {
        path: path.to_path_buf(),
        message: format!("missing entry symbol '{name}'"),
        source: Some(Arc::new(source)),
    }
}

/// A library opened by [`DylibLoader`].
struct DylibModule {
    entry: EntryPoint,
    path: PathBuf,
    // Declared last: fields drop in order, and `entry` points into it.
    #[expect(dead_code, reason = "held only to keep the module mapped")]
    library: Library,
}

impl PluginModule for DylibModule {
    fn register(&self, sink: &mut dyn CreatorSink) {
        debug!(path = %self.path.display(), "invoking plugin library entry point");
        (self.entry)(sink);
    }
}

impl Drop for DylibModule {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "unloading plugin library");
    }
}
