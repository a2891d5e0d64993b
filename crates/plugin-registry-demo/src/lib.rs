//! Sample plugin library for `plugin-registry`.
//!
//! Built as a `cdylib`, it exports the registry entry point and contributes
//! two activation creators, `Clip` and `LeakyRelu`, to the `demo` namespace.
//! Each takes scalar `float32` fields and serialises its parameters as
//! `name=value` pairs separated by `;`.

use std::sync::Arc;

use plugin_registry::{
    CreatorSink, FieldKind, FieldSpec, FieldValue, PluginCreator, PluginField, PluginObject,
};

/// Namespace every creator in this library registers under.
pub const NAMESPACE: &str = "demo";

/// Version shared by this library's creators.
pub const VERSION: &str = "1";

/// Creator for activations parameterised by named scalars.
#[derive(Debug)]
pub struct ActivationCreator {
    name: &'static str,
    defaults: &'static [(&'static str, f32)],
    fields: Vec<FieldSpec>,
}

impl ActivationCreator {
    fn new(name: &'static str, defaults: &'static [(&'static str, f32)]) -> Self {
        Self {
            name,
            defaults,
            fields: defaults
                .iter()
                .map(|(field, _)| FieldSpec::new(*field, FieldKind::Float32))
                .collect(),
        }
    }

    /// Clamps inputs to `[clip_min, clip_max]`.
    #[must_use]
    pub fn clip() -> Self {
        Self::new("Clip", &[("clip_min", 0.0), ("clip_max", 6.0)])
    }

    /// Scales negative inputs by `negative_slope`.
    #[must_use]
    pub fn leaky_relu() -> Self {
        Self::new("LeakyRelu", &[("negative_slope", 0.01)])
    }

    fn build(&self, params: Vec<(&'static str, f32)>) -> Box<dyn PluginObject> {
        Box::new(Activation {
            plugin_type: self.name,
            params,
        })
    }
}

fn scalar(fields: &[PluginField], name: &str) -> Result<Option<f32>, ()> {
    let Some(field) = fields.iter().find(|field| field.name() == name) else {
        return Ok(None);
    };
    match field.value() {
        FieldValue::Float32(values) if values.len() == 1 => Ok(values.first().copied()),
        _ => Err(()),
    }
}

impl PluginCreator for ActivationCreator {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn field_names(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn create_plugin(&self, _name: &str, fields: &[PluginField]) -> Option<Box<dyn PluginObject>> {
        let params = self
            .defaults
            .iter()
            .map(|(field, default)| {
                scalar(fields, field).map(|value| (*field, value.unwrap_or(*default)))
            })
            .collect::<Result<Vec<_>, ()>>()
            .ok()?;
        Some(self.build(params))
    }

    fn deserialize_plugin(&self, _name: &str, data: &[u8]) -> Option<Box<dyn PluginObject>> {
        let text = std::str::from_utf8(data).ok()?;
        let mut pairs = text.split(';');
        let params = self
            .defaults
            .iter()
            .map(|(field, _)| {
                let (key, value) = pairs.next()?.split_once('=')?;
                if key != *field {
                    return None;
                }
                value.parse::<f32>().ok().map(|parsed| (*field, parsed))
            })
            .collect::<Option<Vec<_>>>()?;
        if pairs.next().is_some() {
            return None;
        }
        Some(self.build(params))
    }
}

/// Plugin object built by [`ActivationCreator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    plugin_type: &'static str,
    params: Vec<(&'static str, f32)>,
}

impl Activation {
    /// Returns the value of parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<f32> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| *value)
    }
}

impl PluginObject for Activation {
    fn plugin_type(&self) -> &str {
        self.plugin_type
    }

    fn plugin_version(&self) -> &str {
        VERSION
    }

    fn serialize(&self) -> Vec<u8> {
        self.params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(";")
            .into_bytes()
    }
}

/// Returns fresh instances of every creator this library provides.
#[must_use]
pub fn creators() -> Vec<Arc<dyn PluginCreator>> {
    vec![
        Arc::new(ActivationCreator::clip()),
        Arc::new(ActivationCreator::leaky_relu()),
    ]
}

/// Registers this library's creators with `sink`, stopping at the first
/// rejection.
pub fn register(sink: &mut dyn CreatorSink) {
    for creator in creators() {
        if !sink.register_creator(creator, NAMESPACE) {
            break;
        }
    }
}

plugin_registry::declare_plugin_library!(register);
