//! Plugin-creator registry.
//!
//! Hosts register *plugin creators* (factories for plugin objects) under an
//! identity of name, version, and namespace, look them up again by exact
//! identity, and remove them. Creators may also arrive in bulk from dynamic
//! plugin libraries, which the registry loads and unloads, and failures are
//! forwarded to a host-supplied [`ErrorRecorder`].
//!
//! The crate is organised as follows:
//!
//! - [`identity`] defines [`CreatorIdentity`] and the boundary contract.
//! - [`creator`] defines the [`PluginCreator`] capability and its records.
//! - [`recorder`] defines the [`ErrorRecorder`] capability and a buffered
//!   implementation.
//! - [`table`] is the identity-unique creator table.
//! - [`loader`] opens plugin libraries and defines their entry-point ABI.
//! - [`registry`] is the synchronised facade, [`Registry`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use plugin_registry::{BufferedErrorRecorder, ErrorRecorder, PluginRegistry, Registry};
//! # use plugin_registry::{PluginCreator, PluginField, PluginObject};
//! # struct Relu;
//! # impl PluginCreator for Relu {
//! #     fn name(&self) -> &str { "Relu" }
//! #     fn version(&self) -> &str { "2" }
//! #     fn create_plugin(&self, _: &str, _: &[PluginField]) -> Option<Box<dyn PluginObject>> { None }
//! #     fn deserialize_plugin(&self, _: &str, _: &[u8]) -> Option<Box<dyn PluginObject>> { None }
//! # }
//!
//! let recorder = Arc::new(BufferedErrorRecorder::new());
//! let registry = Registry::new();
//! registry.set_error_recorder(Some(recorder.clone()));
//!
//! assert!(registry.register_creator(Arc::new(Relu), "activations"));
//! assert!(!registry.register_creator(Arc::new(Relu), "activations"));
//! assert_eq!(recorder.num_errors(), 1);
//!
//! let creator = registry.get_plugin_creator("Relu", "2", "activations");
//! assert!(creator.is_some());
//! ```

pub mod creator;
pub mod error;
pub mod identity;
pub mod loader;
pub mod recorder;
pub mod registry;
pub mod table;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::creator::{
    CreatorRecord, FieldKind, FieldSpec, FieldValue, PluginCreator, PluginField, PluginObject,
};
pub use crate::error::{IdentityField, RegistryError};
pub use crate::identity::{CreatorIdentity, MAX_IDENTITY_BYTES};
pub use crate::loader::{
    CreatorSink, DylibLoader, LibraryHandle, ModuleLoader, PluginModule, discover_libraries,
};
pub use crate::recorder::{BufferedErrorRecorder, ErrorCode, ErrorRecorder, RecorderLink, RefCount};
pub use crate::registry::{PluginRegistry, Registry, global_registry};
pub use crate::table::CreatorTable;

#[cfg(test)]
mod tests;
