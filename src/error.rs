//! Error types for registry access operations.
//!
//! This module separates caller bugs (contract violations, use after close)
//! from failures reported by the underlying store and from malformed value
//! data. "Not found" is deliberately absent: open, query and delete
//! operations report it as `None` or `false` instead.

use crate::handle::Hkey;
use crate::store::Status;
use crate::value_type::ValueType;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while accessing the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A precondition on the arguments did not hold. Indicates a caller bug.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// The handle was already closed through this registry.
    #[error("HKEY already closed: {0}")]
    HandleClosed(Hkey),

    /// The store refused the requested access.
    #[error("{operation} failed: access denied")]
    AccessDenied {
        /// Operation that was refused.
        operation: &'static str,
    },

    /// The store reported a failure status.
    #[error("{operation} failed: {status}")]
    Store {
        /// Operation that failed.
        operation: &'static str,
        /// Status code reported by the store.
        status: Status,
    },

    /// The value type has no parsing rule.
    #[error("Unsupported value type: {}", .0.name())]
    UnsupportedValueType(ValueType),

    /// The data length does not match what the value type requires.
    #[error("Invalid length for {}: expected {expected} bytes, got {actual} bytes", .value_type.name())]
    InvalidLength {
        /// Type of the value being decoded.
        value_type: ValueType,
        /// Required length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// The data is not valid UTF-16LE text.
    #[error("Invalid UTF-16 string data ({len} bytes)")]
    InvalidUtf16 {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// Registry access is not available on this platform.
    #[error("The registry is not supported on this platform")]
    UnsupportedPlatform,
}

impl RegistryError {
    /// Maps a failure status reported by the store to an error.
    ///
    /// # Arguments
    ///
    /// * `operation` - Name of the operation that produced the status
    /// * `status` - Status code reported by the store
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use native_reg::error::RegistryError;
    /// # use native_reg::store::Status;
    /// let err = RegistryError::from_status("open_key", Status::ACCESS_DENIED);
    /// assert!(err.is_access_denied());
    /// ```
    pub fn from_status(operation: &'static str, status: Status) -> Self {
        if status == Status::ACCESS_DENIED {
            Self::AccessDenied { operation }
        } else {
            Self::Store { operation, status }
        }
    }

    /// Creates a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// Returns the store status code carried by this error, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::AccessDenied { .. } => Some(Status::ACCESS_DENIED),
            Self::Store { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the store refused access.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Returns true if this error indicates a caller bug rather than a
    /// store or data problem.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::ContractViolation(_) | Self::HandleClosed(_))
    }
}
