//! Test doubles shared by unit, behaviour, and downstream crate tests.

use std::sync::Arc;

use crate::creator::{FieldKind, FieldSpec, FieldValue, PluginCreator, PluginField, PluginObject};

/// Creator that builds [`StubPlugin`] objects and records nothing else.
#[derive(Debug, Clone)]
pub struct StubCreator {
    name: String,
    version: String,
    fields: Vec<FieldSpec>,
}

impl StubCreator {
    /// Creates a stub creator for `name` at `version`.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            fields: vec![FieldSpec::new("payload", FieldKind::Char)],
        }
    }

    /// Wraps a new stub creator in an [`Arc`] trait object.
    #[must_use]
    pub fn shared(name: impl Into<String>, version: impl Into<String>) -> Arc<dyn PluginCreator> {
        Arc::new(Self::new(name, version))
    }
}

impl PluginCreator for StubCreator {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn field_names(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn create_plugin(&self, name: &str, fields: &[PluginField]) -> Option<Box<dyn PluginObject>> {
        let payload = fields
            .iter()
            .find(|field| field.name() == "payload")
            .map(|field| match field.value() {
                FieldValue::Char(text) => text.clone().into_bytes(),
                _ => Vec::new(),
            })
            .unwrap_or_default();
        Some(Box::new(StubPlugin {
            instance: name.to_owned(),
            plugin_type: self.name.clone(),
            version: self.version.clone(),
            payload,
        }))
    }

    fn deserialize_plugin(&self, name: &str, data: &[u8]) -> Option<Box<dyn PluginObject>> {
        Some(Box::new(StubPlugin {
            instance: name.to_owned(),
            plugin_type: self.name.clone(),
            version: self.version.clone(),
            payload: data.to_vec(),
        }))
    }
}

/// Plugin object produced by [`StubCreator`]; serialises to its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubPlugin {
    instance: String,
    plugin_type: String,
    version: String,
    payload: Vec<u8>,
}

impl StubPlugin {
    /// Returns the instance name the plugin was created with.
    #[must_use]
    pub const fn instance(&self) -> &str {
        self.instance.as_str()
    }
}

impl PluginObject for StubPlugin {
    fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    fn plugin_version(&self) -> &str {
        &self.version
    }

    fn serialize(&self) -> Vec<u8> {
        self.payload.clone()
    }
}
