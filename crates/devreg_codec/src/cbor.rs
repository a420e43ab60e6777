//! CBOR encoding of serde types.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest payload [`from_cbor`] accepts.
///
/// Registry records are small descriptors; anything near this size is
/// corrupt or hostile input.
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// Encode a value to CBOR bytes.
///
/// Struct fields are written as a map keyed by field name, in declaration
/// order, so identical values produce identical bytes.
///
/// # Errors
///
/// Returns an error if the value's `Serialize` impl fails, or if the
/// encoding exceeds [`MAX_PAYLOAD_LEN`] and so could not be decoded again.
pub fn to_cbor<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buffer = Vec::new();
    ciborium::into_writer(value, &mut buffer)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    check_len(buffer.len())?;
    Ok(buffer)
}

fn check_len(len: usize) -> CodecResult<()> {
    if len > MAX_PAYLOAD_LEN {
        return Err(CodecError::PayloadTooLarge {
            len,
            limit: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

/// Decode a value from CBOR bytes.
///
/// The input must hold exactly one CBOR item.
///
/// # Errors
///
/// Returns an error if the bytes are not valid CBOR, do not match the
/// shape of `T`, carry trailing data, or exceed [`MAX_PAYLOAD_LEN`].
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    check_len(bytes.len())?;

    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;

    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: reader.len(),
        });
    }
    Ok(value)
}
