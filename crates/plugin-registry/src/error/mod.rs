//! Domain errors raised inside the registry.
//!
//! The public [`PluginRegistry`](crate::PluginRegistry) surface reports
//! failure through `bool` and `Option` returns because it sits on a module
//! boundary. These structured errors carry the detail on the way there: they
//! are logged, forwarded to the error recorder, and exposed directly by the
//! `try_` variants on [`Registry`](crate::Registry).

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::identity::CreatorIdentity;
use crate::recorder::ErrorCode;

/// Identity field named in a [`RegistryError::ContractViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    /// The creator name.
    Name,
    /// The creator version.
    Version,
    /// The creator namespace.
    Namespace,
}

impl IdentityField {
    /// Returns the canonical field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Version => "version",
            Self::Namespace => "namespace",
        }
    }
}

impl std::fmt::Display for IdentityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors arising from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A creator with the same identity is already registered.
    #[error("plugin creator {identity} is already registered")]
    Conflict {
        /// Identity that collided.
        identity: CreatorIdentity,
    },

    /// No creator with the given identity is registered.
    #[error("plugin creator {identity} not found in registry")]
    NotFound {
        /// Identity that was looked up.
        identity: CreatorIdentity,
    },

    /// A caller-supplied identity string broke the boundary contract.
    #[error("creator {field} of {len} bytes violates the identity contract")]
    ContractViolation {
        /// Offending field.
        field: IdentityField,
        /// Byte length of the offending value.
        len: usize,
    },

    /// The dynamic module could not be opened or lacks the entry point.
    #[error("failed to load plugin library '{}': {message}", path.display())]
    LoadFailure {
        /// Path handed to the loader.
        path: PathBuf,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying loader error.
        #[source]
        source: Option<Arc<libloading::Error>>,
    },

    /// The module was built against an incompatible entry-point ABI.
    #[error(
        "plugin library '{}' declares ABI version {found}, expected {expected}",
        path.display()
    )]
    AbiMismatch {
        /// Path handed to the loader.
        path: PathBuf,
        /// ABI version spoken by this registry.
        expected: u32,
        /// ABI version exported by the module.
        found: u32,
    },

    /// A creator registered during a library load collided with a live one.
    #[error(
        "plugin library '{}' tried to register {identity}, which already exists",
        path.display()
    )]
    RegistrationConflict {
        /// Path of the library being loaded.
        path: PathBuf,
        /// Identity that collided.
        identity: CreatorIdentity,
    },
}

impl RegistryError {
    /// Builds a [`RegistryError::LoadFailure`] without an underlying source.
    pub(crate) fn load_failure(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::LoadFailure {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Returns the error-recorder code describing this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Conflict { .. } | Self::ContractViolation { .. } => ErrorCode::InvalidArgument,
            Self::NotFound { .. } => ErrorCode::InvalidState,
            Self::LoadFailure { .. } | Self::RegistrationConflict { .. } => {
                ErrorCode::FailedInitialization
            }
            Self::AbiMismatch { .. } => ErrorCode::UnsupportedState,
        }
    }
}
