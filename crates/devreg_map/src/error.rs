//! Error types for replicated map operations.

use thiserror::Error;

/// Result type for map operations.
pub type MapResult<T> = Result<T, MapError>;

/// Errors that can occur while talking to a replicated map.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MapError {
    /// A conditional write found a different version than expected.
    #[error("version mismatch on key {key:?}: expected {expected}, found {actual:?}")]
    VersionMismatch {
        /// The key the write targeted.
        key: String,
        /// The version the caller expected.
        expected: u64,
        /// The version actually held, `None` if the key is absent.
        actual: Option<u64>,
    },

    /// The map (or its session) has been closed.
    #[error("map is closed")]
    Closed,

    /// The map could not be reached or rejected the request.
    #[error("map unavailable: {0}")]
    Unavailable(String),
}

impl MapError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if this error reports a failed precondition.
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_display_names_versions() {
        let err = MapError::VersionMismatch {
            key: "d1".into(),
            expected: 3,
            actual: Some(4),
        };
        let msg = err.to_string();
        assert!(msg.contains("d1"));
        assert!(msg.contains('3'));
        assert!(msg.contains('4'));
        assert!(err.is_version_mismatch());
    }

    #[test]
    fn closed_is_not_mismatch() {
        assert!(!MapError::Closed.is_version_mismatch());
        assert!(!MapError::unavailable("partition").is_version_mismatch());
    }
}
