//! Dynamic plugin libraries and the entry-point contract they implement.
//!
//! A plugin library exports two symbols, normally generated by
//! [`declare_plugin_library!`](crate::declare_plugin_library):
//!
//! - `PLUGIN_REGISTRY_ABI_VERSION`, a `u32` that must equal [`ABI_VERSION`];
//! - `plugin_registry_entry_v1`, an [`EntryPoint`] that registers the
//!   library's creators through the [`CreatorSink`] it is handed.
//!
//! The entry point uses the Rust ABI and passes trait objects, so a library
//! must be built with the same toolchain and the same `plugin-registry`
//! release as the host. The version symbol is checked before the entry point
//! is called.
//!
//! Opening modules goes through the [`ModuleLoader`] seam. Production code
//! uses [`DylibLoader`]; tests substitute in-memory modules.

use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;

use crate::creator::PluginCreator;
use crate::error::RegistryError;

mod discover;
mod dylib;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use self::discover::{discover_libraries, is_dynamic_library};
pub use self::dylib::DylibLoader;

/// Entry-point ABI spoken by this release.
pub const ABI_VERSION: u32 = 1;

/// NUL-terminated name of the exported ABI version static.
pub const ABI_VERSION_SYMBOL: &[u8] = b"PLUGIN_REGISTRY_ABI_VERSION\0";

/// NUL-terminated name of the exported registration entry point.
pub const ENTRY_SYMBOL: &[u8] = b"plugin_registry_entry_v1\0";

/// Signature of a library's registration entry point.
pub type EntryPoint = fn(&mut dyn CreatorSink);

/// Opaque token for one loaded library.
///
/// Handles are allocated per registry and never reused by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryHandle(NonZeroU64);

impl LibraryHandle {
    pub(crate) const fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lib#{}", self.0)
    }
}

/// Registration surface handed to a library's entry point.
pub trait CreatorSink {
    /// Registers `creator` under `namespace`.
    ///
    /// Returns `false` if the identity is already registered or violates the
    /// identity contract. A single `false` fails the whole library load.
    fn register_creator(&mut self, creator: Arc<dyn PluginCreator>, namespace: &str) -> bool;
}

/// One opened plugin module.
///
/// Dropping the module releases the underlying resource. The registry drops
/// it only after every creator it contributed has been released.
pub trait PluginModule: Send {
    /// Invokes the module's registration entry point.
    fn register(&self, sink: &mut dyn CreatorSink);
}

/// Opens plugin modules from filesystem paths.
pub trait ModuleLoader: Send + Sync {
    /// Opens the module at `path` and resolves its entry point.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::LoadFailure`] if the module cannot be opened
    /// or lacks the required symbols, or [`RegistryError::AbiMismatch`] if it
    /// was built for a different entry-point ABI.
    fn open(&self, path: &Path) -> Result<Box<dyn PluginModule>, RegistryError>;
}

/// Exports the entry-point symbols for a plugin library crate.
///
/// The argument names a `fn(&mut dyn CreatorSink)` that performs the
/// library's registrations.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use plugin_registry::CreatorSink;
///
/// fn register(sink: &mut dyn CreatorSink) {
///     sink.register_creator(Arc::new(MyCreator), "my_namespace");
/// }
///
/// plugin_registry::declare_plugin_library!(register);
/// ```
#[macro_export]
macro_rules! declare_plugin_library {
    ($register:path) => {
        /// Entry-point ABI version this library was built against.
        #[unsafe(no_mangle)]
        pub static PLUGIN_REGISTRY_ABI_VERSION: u32 = $crate::loader::ABI_VERSION;

        /// Registers this library's plugin creators.
        #[unsafe(no_mangle)]
        pub fn plugin_registry_entry_v1(sink: &mut dyn $crate::loader::CreatorSink) {
            let entry: $crate::loader::EntryPoint = $register;
            entry(sink);
        }
    };
}

#[cfg(test)]
mod tests;
