//! Error types for the device server.

use devreg_core::{CoreError, DeviceId, Revision};
use devreg_map::MapError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned by the device service.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request contents.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request carried a stale revision.
    #[error("conflict on device {id}: expected {expected}, found {actual:?}")]
    Conflict {
        /// The device that was written.
        id: DeviceId,
        /// Revision carried by the request.
        expected: Revision,
        /// Revision currently stored, `None` if the device is gone.
        actual: Option<Revision>,
    },

    /// The backing store could not be reached in time.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The server has been shut down.
    #[error("server is closed")]
    Closed,

    /// A stored record could not be decoded.
    #[error("stored record for device {id} is corrupt: {message}")]
    CorruptRecord {
        /// The device whose record is corrupt.
        id: DeviceId,
        /// Description of the decode failure.
        message: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_) | ServerError::Conflict { .. }
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::Unavailable(_)
                | ServerError::Closed
                | ServerError::CorruptRecord { .. }
                | ServerError::Internal(_)
        )
    }

    /// Returns true if the same request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServerError::Unavailable(_))
    }
}

impl From<CoreError> for ServerError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Conflict {
                id,
                expected,
                actual,
            } => ServerError::Conflict {
                id,
                expected,
                actual,
            },
            CoreError::Closed => ServerError::Closed,
            CoreError::Decode { id, source } => ServerError::CorruptRecord {
                id,
                message: source.to_string(),
            },
            CoreError::Encode(source) => {
                ServerError::InvalidRequest(format!("device cannot be stored: {source}"))
            }
            err @ (CoreError::Timeout { .. } | CoreError::Map(MapError::Unavailable(_))) => {
                ServerError::Unavailable(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}
