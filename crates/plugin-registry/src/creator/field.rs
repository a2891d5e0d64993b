//! Typed creation fields passed to [`PluginCreator::create_plugin`].
//!
//! [`PluginCreator::create_plugin`]: super::PluginCreator::create_plugin

/// Element type of a plugin field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed 8-bit integers.
    Int8,
    /// Signed 16-bit integers.
    Int16,
    /// Signed 32-bit integers.
    Int32,
    /// 32-bit floats.
    Float32,
    /// 64-bit floats.
    Float64,
    /// Character data.
    Char,
    /// Opaque bytes.
    Unknown,
}

impl FieldKind {
    /// Returns the lower-case name of the element type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Char => "char",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of a field a creator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
}

impl FieldSpec {
    /// Creates a field descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the expected element type.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Value carried by a [`PluginField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Signed 8-bit integers.
    Int8(Vec<i8>),
    /// Signed 16-bit integers.
    Int16(Vec<i16>),
    /// Signed 32-bit integers.
    Int32(Vec<i32>),
    /// 32-bit floats.
    Float32(Vec<f32>),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// Character data.
    Char(String),
    /// Opaque bytes.
    Unknown(Vec<u8>),
}

impl FieldValue {
    /// Returns the element type of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Int8(_) => FieldKind::Int8,
            Self::Int16(_) => FieldKind::Int16,
            Self::Int32(_) => FieldKind::Int32,
            Self::Float32(_) => FieldKind::Float32,
            Self::Float64(_) => FieldKind::Float64,
            Self::Char(_) => FieldKind::Char,
            Self::Unknown(_) => FieldKind::Unknown,
        }
    }

    /// Returns the number of elements held.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(values) => values.len(),
            Self::Int16(values) => values.len(),
            Self::Int32(values) => values.len(),
            Self::Float32(values) => values.len(),
            Self::Float64(values) => values.len(),
            Self::Char(text) => text.len(),
            Self::Unknown(bytes) => bytes.len(),
        }
    }

    /// Returns `true` when the value holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named creation argument.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginField {
    name: String,
    value: FieldValue,
}

impl PluginField {
    /// Creates a named field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the carried value.
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Returns `true` if the value's type matches the descriptor.
    #[must_use]
    pub fn conforms_to(&self, spec: &FieldSpec) -> bool {
        self.name == spec.name() && self.value.kind() == spec.kind()
    }
}
