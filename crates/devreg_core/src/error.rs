//! Error types for the device store.

use crate::device::{DeviceId, Revision};
use devreg_codec::CodecError;
use devreg_map::MapError;
use std::time::Duration;
use thiserror::Error;

/// Result type for store operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in device store operations.
///
/// A missing device is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The stored revision no longer matches the caller's.
    ///
    /// The caller must reload the device and retry.
    #[error("revision conflict on device {id}: expected {expected}, found {actual:?}")]
    Conflict {
        /// The device that was written.
        id: DeviceId,
        /// The revision the caller held.
        expected: Revision,
        /// The revision currently stored, `None` if the device is gone.
        actual: Option<Revision>,
    },

    /// A stored record could not be decoded.
    #[error("cannot decode device {id}: {source}")]
    Decode {
        /// The device whose record is corrupt.
        id: DeviceId,
        /// The codec failure.
        #[source]
        source: CodecError,
    },

    /// A device could not be encoded.
    #[error("cannot encode device: {0}")]
    Encode(#[source] CodecError),

    /// The backing map did not answer in time.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// Name of the operation that timed out.
        operation: &'static str,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The store has been closed.
    #[error("device store is closed")]
    Closed,

    /// Any other failure reported by the backing map.
    #[error("map error: {0}")]
    Map(MapError),
}

impl CoreError {
    /// Creates a timeout error.
    pub fn timeout(operation: &'static str, timeout: Duration) -> Self {
        Self::Timeout { operation, timeout }
    }

    /// Returns true if this error reports a stale revision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<MapError> for CoreError {
    fn from(error: MapError) -> Self {
        match error {
            MapError::VersionMismatch {
                key,
                expected,
                actual,
            } => Self::Conflict {
                id: DeviceId::from(key),
                expected: Revision::new(expected),
                actual: actual.map(Revision::new),
            },
            MapError::Closed => Self::Closed,
            other => Self::Map(other),
        }
    }
}
