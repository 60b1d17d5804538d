//! Error types for descriptor I/O operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for descriptor operations
pub type Result<T> = std::result::Result<T, FdError>;

/// Errors that can occur during descriptor I/O
#[derive(Debug, Error)]
pub enum FdError {
    /// Request rejected before touching the descriptor
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Reason for rejection
        reason: String,
    },

    /// Path does not exist
    #[error("No such file: {path}")]
    NotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Underlying read/write primitive reported an error
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// The caller/runner protocol was violated
    ///
    /// Raised when a transfer is started while one is already in flight, or
    /// when a worker exits without reporting a completion. This indicates a
    /// bug in the calling code, not a transient runtime condition.
    #[error("Protocol violation: {reason}")]
    ProtocolViolation {
        /// Description of the violated precondition
        reason: String,
    },
}

impl FdError {
    /// Create an invalid-argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a protocol-violation error
    pub fn protocol_violation(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
        }
    }

    /// True if this error is the invalid-argument rejection
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// True if this error is a caller/runner protocol violation
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation { .. })
    }
}
