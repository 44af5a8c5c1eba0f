//! Whitelisted value kinds carried by intent extras.
//!
//! The platform only ships booleans, numeric primitives and their arrays,
//! strings, and two categories of structured objects across process
//! boundaries. [`ExtraValue`] enumerates exactly those; anything else has to
//! be converted by the caller before it reaches the transport.

use std::fmt;

/// Archived structured object ("parcel"), tagged with the Rust type it was produced from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParcelBlob {
    /// Fully qualified name of the archived type.
    pub type_name: String,
    /// Archive bytes.
    pub bytes: Vec<u8>,
}

/// Generic serialized object, tagged with the Rust type it was produced from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialBlob {
    /// Fully qualified name of the serialized type.
    pub type_name: String,
    /// Serialized document.
    pub document: String,
}

/// A single named field value inside an [`crate::Intent`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraValue {
    Bool(bool),
    Byte(u8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    CharArray(Vec<char>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    String(String),
    StringArray(Vec<String>),
    /// Platform-native structured object. Preferred over [`ExtraValue::Serializable`].
    Parcel(ParcelBlob),
    /// Generic serializable object.
    Serializable(SerialBlob),
}

/// Discriminant of an [`ExtraValue`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtraKind {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    BoolArray,
    ByteArray,
    CharArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    String,
    StringArray,
    Parcel,
    Serializable,
}

impl ExtraValue {
    pub fn kind(&self) -> ExtraKind {
        match self {
            ExtraValue::Bool(_) => ExtraKind::Bool,
            ExtraValue::Byte(_) => ExtraKind::Byte,
            ExtraValue::Char(_) => ExtraKind::Char,
            ExtraValue::Short(_) => ExtraKind::Short,
            ExtraValue::Int(_) => ExtraKind::Int,
            ExtraValue::Long(_) => ExtraKind::Long,
            ExtraValue::Float(_) => ExtraKind::Float,
            ExtraValue::Double(_) => ExtraKind::Double,
            ExtraValue::BoolArray(_) => ExtraKind::BoolArray,
            ExtraValue::ByteArray(_) => ExtraKind::ByteArray,
            ExtraValue::CharArray(_) => ExtraKind::CharArray,
            ExtraValue::ShortArray(_) => ExtraKind::ShortArray,
            ExtraValue::IntArray(_) => ExtraKind::IntArray,
            ExtraValue::LongArray(_) => ExtraKind::LongArray,
            ExtraValue::FloatArray(_) => ExtraKind::FloatArray,
            ExtraValue::DoubleArray(_) => ExtraKind::DoubleArray,
            ExtraValue::String(_) => ExtraKind::String,
            ExtraValue::StringArray(_) => ExtraKind::StringArray,
            ExtraValue::Parcel(_) => ExtraKind::Parcel,
            ExtraValue::Serializable(_) => ExtraKind::Serializable,
        }
    }

    /// Returns the string payload when this value is a [`ExtraValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtraValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ExtraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtraKind::Bool => "bool",
            ExtraKind::Byte => "byte",
            ExtraKind::Char => "char",
            ExtraKind::Short => "short",
            ExtraKind::Int => "int",
            ExtraKind::Long => "long",
            ExtraKind::Float => "float",
            ExtraKind::Double => "double",
            ExtraKind::BoolArray => "bool[]",
            ExtraKind::ByteArray => "byte[]",
            ExtraKind::CharArray => "char[]",
            ExtraKind::ShortArray => "short[]",
            ExtraKind::IntArray => "int[]",
            ExtraKind::LongArray => "long[]",
            ExtraKind::FloatArray => "float[]",
            ExtraKind::DoubleArray => "double[]",
            ExtraKind::String => "string",
            ExtraKind::StringArray => "string[]",
            ExtraKind::Parcel => "parcel",
            ExtraKind::Serializable => "serializable",
        };
        f.write_str(name)
    }
}
