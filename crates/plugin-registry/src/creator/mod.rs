//! Plugin creator capability and the records the registry stores.
//!
//! A [`PluginCreator`] is a factory supplied by the host or by a loaded
//! library. The registry never inspects its concrete type: it stores a
//! [`CreatorRecord`] pairing the creator with the identity it was registered
//! under and, when a library contributed it, the owning [`LibraryHandle`].

use std::fmt;
use std::sync::Arc;

use crate::identity::CreatorIdentity;
use crate::loader::LibraryHandle;

mod field;

pub use self::field::{FieldKind, FieldSpec, FieldValue, PluginField};

/// Object constructed by a [`PluginCreator`].
///
/// Only identity and serialisation are modelled; execution belongs to the
/// engine that consumes the registry.
pub trait PluginObject: Send {
    /// Returns the plugin type name.
    fn plugin_type(&self) -> &str;

    /// Returns the plugin version.
    fn plugin_version(&self) -> &str;

    /// Serialises the plugin's state so it can be recreated by
    /// [`PluginCreator::deserialize_plugin`].
    fn serialize(&self) -> Vec<u8>;
}

/// Factory capability for one kind of plugin.
///
/// Implementations come from outside the registry, usually from a dynamic
/// library. Creation failures are reported as `None`; a creator must not
/// panic across the module boundary.
///
/// # Example
///
/// ```
/// use plugin_registry::{PluginCreator, PluginField, PluginObject};
///
/// struct Identity;
///
/// impl PluginObject for Identity {
///     fn plugin_type(&self) -> &str { "Identity" }
///     fn plugin_version(&self) -> &str { "1" }
///     fn serialize(&self) -> Vec<u8> { Vec::new() }
/// }
///
/// struct IdentityCreator;
///
/// impl PluginCreator for IdentityCreator {
///     fn name(&self) -> &str { "Identity" }
///     fn version(&self) -> &str { "1" }
///     fn create_plugin(&self, _name: &str, _fields: &[PluginField]) -> Option<Box<dyn PluginObject>> {
///         Some(Box::new(Identity))
///     }
///     fn deserialize_plugin(&self, _name: &str, _data: &[u8]) -> Option<Box<dyn PluginObject>> {
///         Some(Box::new(Identity))
///     }
/// }
///
/// let plugin = IdentityCreator.create_plugin("layer0", &[]).expect("created");
/// assert_eq!(plugin.plugin_type(), "Identity");
/// ```
pub trait PluginCreator: Send + Sync {
    /// Returns the plugin name this creator builds.
    fn name(&self) -> &str;

    /// Returns the plugin version this creator builds.
    fn version(&self) -> &str;

    /// Describes the fields accepted by [`PluginCreator::create_plugin`].
    fn field_names(&self) -> &[FieldSpec] {
        &[]
    }

    /// Builds a new plugin object named `name` from the supplied fields.
    fn create_plugin(&self, name: &str, fields: &[PluginField]) -> Option<Box<dyn PluginObject>>;

    /// Rebuilds a plugin object from bytes produced by
    /// [`PluginObject::serialize`].
    fn deserialize_plugin(&self, name: &str, data: &[u8]) -> Option<Box<dyn PluginObject>>;
}

/// One live registry entry.
#[derive(Clone)]
pub struct CreatorRecord {
    identity: CreatorIdentity,
    creator: Arc<dyn PluginCreator>,
    library: Option<LibraryHandle>,
}

impl CreatorRecord {
    pub(crate) fn new(
        identity: CreatorIdentity,
        creator: Arc<dyn PluginCreator>,
        library: Option<LibraryHandle>,
    ) -> Self {
        Self {
            identity,
            creator,
            library,
        }
    }

    /// Returns the identity the creator was registered under.
    #[must_use]
    pub const fn identity(&self) -> &CreatorIdentity {
        &self.identity
    }

    /// Returns the creator capability.
    #[must_use]
    pub const fn creator(&self) -> &Arc<dyn PluginCreator> {
        &self.creator
    }

    /// Returns the library that contributed this creator, if any.
    #[must_use]
    pub const fn library(&self) -> Option<LibraryHandle> {
        self.library
    }

    /// Returns `true` if this record holds exactly `creator`.
    #[must_use]
    pub fn holds(&self, creator: &dyn PluginCreator) -> bool {
        same_creator(self.creator.as_ref(), creator)
    }
}

impl fmt::Debug for CreatorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatorRecord")
            .field("identity", &self.identity)
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

/// Compares creators by object address, ignoring vtable identity.
pub(crate) fn same_creator(left: &dyn PluginCreator, right: &dyn PluginCreator) -> bool {
    std::ptr::addr_eq(
        std::ptr::from_ref(left),
        std::ptr::from_ref(right),
    )
}
