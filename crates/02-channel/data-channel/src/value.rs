//! Typed payloads and their mapping onto the transport whitelist.
//!
//! Sending converts through [`IntoChannelValue`]; receiving extracts through
//! [`FromChannelValue`], which reports a wrong-kind payload explicitly instead
//! of yielding an unchecked cast.

use rkyv::{
    api::high::{HighDeserializer, HighSerializer, HighValidator},
    bytecheck::CheckBytes,
    rancor::Error as RkyvError,
    ser::allocator::ArenaHandle,
    util::AlignedVec,
    Archive,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use transport::{ExtraKind, ExtraValue};
use transport_codecs::{
    decode_parcel, decode_serial, parcel_extra, serial_extra, CodecError, CodecResult,
};

use crate::error::{ChannelError, ChannelResult};

/// Why an inbound field could not be read as the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("expected {expected}, found {found}")]
    WrongKind {
        expected: ExtraKind,
        found: ExtraKind,
    },

    #[error("structured payload rejected: {0}")]
    Structured(String),
}

impl ExtractError {
    fn wrong_kind(expected: ExtraKind, found: &ExtraValue) -> Self {
        ExtractError::WrongKind {
            expected,
            found: found.kind(),
        }
    }
}

impl From<CodecError> for ExtractError {
    fn from(err: CodecError) -> Self {
        ExtractError::Structured(err.to_string())
    }
}

/// Values that can be attached to an outbound intent.
pub trait IntoChannelValue {
    /// Only structured objects can fail to convert.
    fn into_extra(self) -> CodecResult<ExtraValue>;
}

/// Values that can be read back from an inbound intent.
pub trait FromChannelValue: Sized {
    fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError>;
}

macro_rules! copy_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl IntoChannelValue for $ty {
            fn into_extra(self) -> CodecResult<ExtraValue> {
                Ok(ExtraValue::$variant(self))
            }
        }

        impl FromChannelValue for $ty {
            fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError> {
                match extra {
                    ExtraValue::$variant(value) => Ok(*value),
                    other => Err(ExtractError::wrong_kind(ExtraKind::$variant, other)),
                }
            }
        }
    )*};
}

macro_rules! owned_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl IntoChannelValue for $ty {
            fn into_extra(self) -> CodecResult<ExtraValue> {
                Ok(ExtraValue::$variant(self))
            }
        }

        impl FromChannelValue for $ty {
            fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError> {
                match extra {
                    ExtraValue::$variant(value) => Ok(value.clone()),
                    other => Err(ExtractError::wrong_kind(ExtraKind::$variant, other)),
                }
            }
        }
    )*};
}

copy_value!(
    bool => Bool,
    u8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

owned_value!(
    Vec<bool> => BoolArray,
    Vec<u8> => ByteArray,
    Vec<char> => CharArray,
    Vec<i16> => ShortArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    String => String,
    Vec<String> => StringArray,
);

impl IntoChannelValue for &str {
    fn into_extra(self) -> CodecResult<ExtraValue> {
        Ok(ExtraValue::String(self.to_string()))
    }
}

impl IntoChannelValue for ExtraValue {
    fn into_extra(self) -> CodecResult<ExtraValue> {
        Ok(self)
    }
}

impl FromChannelValue for ExtraValue {
    fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError> {
        Ok(extra.clone())
    }
}

/// Structured object sent as an rkyv archive. Preferred for types that can be archived.
#[derive(Clone, Debug, PartialEq)]
pub struct Parcel<T>(pub T);

impl<T> IntoChannelValue for Parcel<T>
where
    T: Archive,
    T: for<'a> rkyv::Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, RkyvError>>,
{
    fn into_extra(self) -> CodecResult<ExtraValue> {
        parcel_extra(&self.0)
    }
}

impl<T> FromChannelValue for Parcel<T>
where
    T: Archive,
    T::Archived: for<'a> CheckBytes<HighValidator<'a, RkyvError>>
        + rkyv::Deserialize<T, HighDeserializer<RkyvError>>,
{
    fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError> {
        match extra {
            ExtraValue::Parcel(blob) => Ok(Parcel(decode_parcel(blob)?)),
            other => Err(ExtractError::wrong_kind(ExtraKind::Parcel, other)),
        }
    }
}

/// Structured object sent as a serde document.
#[derive(Clone, Debug, PartialEq)]
pub struct Serial<T>(pub T);

impl<T> IntoChannelValue for Serial<T>
where
    T: serde::Serialize,
{
    fn into_extra(self) -> CodecResult<ExtraValue> {
        serial_extra(&self.0)
    }
}

impl<T> FromChannelValue for Serial<T>
where
    T: DeserializeOwned,
{
    fn from_extra(extra: &ExtraValue) -> Result<Self, ExtractError> {
        match extra {
            ExtraValue::Serializable(blob) => Ok(Serial(decode_serial(blob)?)),
            other => Err(ExtractError::wrong_kind(ExtraKind::Serializable, other)),
        }
    }
}

/// A key with an optional value; the unit of data sent over a namespace.
///
/// Entries without a value are skipped on send.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelData<T> {
    pub key: String,
    pub value: Option<T>,
}

impl<T> ChannelData<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }

    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

impl<T: IntoChannelValue> ChannelData<T> {
    /// Converts into a named extra, or `None` when there is no value to send.
    pub(crate) fn into_field(self) -> ChannelResult<Option<(String, ExtraValue)>> {
        let Some(value) = self.value else {
            return Ok(None);
        };
        match value.into_extra() {
            Ok(extra) => Ok(Some((self.key, extra))),
            Err(source) => Err(ChannelError::UnsupportedValue {
                key: self.key,
                source,
            }),
        }
    }
}
