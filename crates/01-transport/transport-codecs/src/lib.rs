//! Codecs for structured-object extras.
//!
//! Two categories of objects may cross the transport besides primitives:
//! * parcels – zero-copy rkyv archives, validated with bytecheck on decode;
//! * serializable objects – serde documents encoded as JSON.
//!
//! Both are tagged with the Rust type name they were produced from so the
//! receiving side can tell a wrong-kind payload apart from a corrupt one.

use rkyv::{
    api::high::{to_bytes, HighDeserializer, HighSerializer, HighValidator},
    bytecheck::CheckBytes,
    rancor::Error,
    ser::allocator::ArenaHandle,
    util::AlignedVec,
    Archive, Deserialize, Serialize,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use transport::{ExtraValue, ParcelBlob, SerialBlob};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialize failure: {0}")]
    Serialize(String),

    #[error("decode failure: {0}")]
    Decode(String),

    #[error("payload holds `{found}`, expected `{expected}`")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
}

/// Archives `value` into a parcel blob.
pub fn encode_parcel<T>(value: &T) -> CodecResult<ParcelBlob>
where
    T: Archive,
    T: for<'a> Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, Error>>,
{
    let bytes = to_bytes::<Error>(value)
        .map(|aligned| aligned.to_vec())
        .map_err(|err| CodecError::Serialize(err.to_string()))?;
    Ok(ParcelBlob {
        type_name: std::any::type_name::<T>().to_string(),
        bytes,
    })
}

/// Validates and deserializes a parcel blob produced by [`encode_parcel`].
pub fn decode_parcel<T>(blob: &ParcelBlob) -> CodecResult<T>
where
    T: Archive,
    T::Archived: for<'a> CheckBytes<HighValidator<'a, Error>> + Deserialize<T, HighDeserializer<Error>>,
{
    ensure_type::<T>(&blob.type_name)?;
    // Blobs arrive as plain byte vectors; archives must be read from aligned storage.
    let mut aligned = AlignedVec::<16>::with_capacity(blob.bytes.len());
    aligned.extend_from_slice(&blob.bytes);
    rkyv::from_bytes::<T, Error>(aligned.as_slice())
        .map_err(|err| CodecError::Decode(format!("validation failure: {err}")))
}

/// Serializes `value` into a JSON-backed blob.
pub fn encode_serial<T>(value: &T) -> CodecResult<SerialBlob>
where
    T: serde::Serialize,
{
    let document =
        serde_json::to_string(value).map_err(|err| CodecError::Serialize(err.to_string()))?;
    Ok(SerialBlob {
        type_name: std::any::type_name::<T>().to_string(),
        document,
    })
}

pub fn decode_serial<T>(blob: &SerialBlob) -> CodecResult<T>
where
    T: DeserializeOwned,
{
    ensure_type::<T>(&blob.type_name)?;
    serde_json::from_str(&blob.document).map_err(|err| CodecError::Decode(err.to_string()))
}

/// Convenience wrapper producing a ready-to-send [`ExtraValue::Parcel`].
pub fn parcel_extra<T>(value: &T) -> CodecResult<ExtraValue>
where
    T: Archive,
    T: for<'a> Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, Error>>,
{
    encode_parcel(value).map(ExtraValue::Parcel)
}

/// Convenience wrapper producing a ready-to-send [`ExtraValue::Serializable`].
pub fn serial_extra<T>(value: &T) -> CodecResult<ExtraValue>
where
    T: serde::Serialize,
{
    encode_serial(value).map(ExtraValue::Serializable)
}

fn ensure_type<T>(found: &str) -> CodecResult<()> {
    let expected = std::any::type_name::<T>();
    if found != expected {
        return Err(CodecError::TypeMismatch {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}
