//! Creator identity triple and its boundary contract.
//!
//! A [`CreatorIdentity`] is the unique key of the registry. Matching is exact
//! byte equality on all three fields: no normalisation, no case folding, no
//! wildcards.
//!
//! Identity strings cross the plugin boundary as NUL-terminated text of at
//! most [`MAX_IDENTITY_BYTES`] bytes including the terminator. Values outside
//! that contract are rejected, never truncated.

use std::fmt;

use crate::error::{IdentityField, RegistryError};

/// Maximum size of one identity field, including the NUL terminator.
pub const MAX_IDENTITY_BYTES: usize = 1024;

/// Unique key of a registered plugin creator.
///
/// # Example
///
/// ```
/// use plugin_registry::CreatorIdentity;
///
/// let identity = CreatorIdentity::new("Foo", "1", "ns");
/// assert_eq!(identity.to_string(), "Foo/1@ns");
/// assert_eq!(CreatorIdentity::new("Foo", "1", "").to_string(), "Foo/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatorIdentity {
    name: String,
    version: String,
    namespace: String,
}

impl CreatorIdentity {
    /// Creates an identity without checking the boundary contract.
    ///
    /// Registry operations validate identities before using them; use
    /// [`CreatorIdentity::checked`] to surface violations early.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            namespace: namespace.into(),
        }
    }

    /// Creates an identity, rejecting fields that break the boundary contract.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractViolation`] if any field is longer than
    /// `MAX_IDENTITY_BYTES - 1` bytes or contains a NUL byte.
    pub fn checked(
        name: impl Into<String>,
        version: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let identity = Self::new(name, version, namespace);
        identity.validate()?;
        Ok(identity)
    }

    /// Verifies every field against the boundary contract.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ContractViolation`] naming the first field
    /// that is over length or carries an interior NUL.
    pub fn validate(&self) -> Result<(), RegistryError> {
        check_field(IdentityField::Name, &self.name)?;
        check_field(IdentityField::Version, &self.version)?;
        check_field(IdentityField::Namespace, &self.namespace)
    }

    /// Returns the creator name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the creator version.
    #[must_use]
    pub const fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Returns the namespace the creator was registered under.
    #[must_use]
    pub const fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns `true` when all three fields equal the given strings.
    #[must_use]
    pub fn matches(&self, name: &str, version: &str, namespace: &str) -> bool {
        self.name == name && self.version == version && self.namespace == namespace
    }
}

impl fmt::Display for CreatorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if !self.namespace.is_empty() {
            write!(f, "@{}", self.namespace)?;
        }
        Ok(())
    }
}

/// Checks a lookup triple without allocating an identity.
pub(crate) fn check_lookup(name: &str, version: &str, namespace: &str) -> Result<(), RegistryError> {
    check_field(IdentityField::Name, name)?;
    check_field(IdentityField::Version, version)?;
    check_field(IdentityField::Namespace, namespace)
}

fn check_field(field: IdentityField, value: &str) -> Result<(), RegistryError> {
    // One byte is reserved for the terminator on the C side of the boundary.
    if value.len() >= MAX_IDENTITY_BYTES || value.as_bytes().contains(&0) {
        return Err(RegistryError::ContractViolation {
            field,
            len: value.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
