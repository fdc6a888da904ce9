//! # Domain Errors
//!
//! Error taxonomy for OTP issuance and verification.
//!
//! Every failure surfaced to a caller carries a stable machine-readable
//! [`OtpErrorKind`] plus a human-readable message. Store and channel
//! adapters report their own error types which convert into [`OtpError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// OTP subsystem error types.
#[derive(Debug, Error)]
pub enum OtpError {
    /// Malformed input, rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required notification channel is not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OTP store rejected an operation.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A notification channel failed to deliver the code.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// No live record matched the submitted code.
    ///
    /// Deliberately does not distinguish a wrong code from an expired or
    /// already used one, or from an unknown destination.
    #[error("Invalid or expired code")]
    InvalidOrExpired,

    /// A live record matched but its attempt budget is exhausted.
    #[error("Too many failed attempts ({max} allowed), please request a new code")]
    MaxAttemptsExceeded {
        /// Configured attempt budget
        max: u32,
    },
}

impl OtpError {
    /// Stable machine-readable kind of this error.
    pub fn kind(&self) -> OtpErrorKind {
        match self {
            OtpError::Validation(_) => OtpErrorKind::ValidationError,
            OtpError::Configuration(_) => OtpErrorKind::ConfigurationError,
            OtpError::Storage(_) => OtpErrorKind::StorageError,
            OtpError::Dispatch(_) => OtpErrorKind::DispatchError,
            OtpError::InvalidOrExpired => OtpErrorKind::InvalidOrExpired,
            OtpError::MaxAttemptsExceeded { .. } => OtpErrorKind::MaxAttemptsExceeded,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        OtpError::Validation(msg.into())
    }
}

/// Machine-readable error kind, serialized in snake_case on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpErrorKind {
    ValidationError,
    ConfigurationError,
    StorageError,
    DispatchError,
    InvalidOrExpired,
    MaxAttemptsExceeded,
}

impl OtpErrorKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpErrorKind::ValidationError => "validation_error",
            OtpErrorKind::ConfigurationError => "configuration_error",
            OtpErrorKind::StorageError => "storage_error",
            OtpErrorKind::DispatchError => "dispatch_error",
            OtpErrorKind::InvalidOrExpired => "invalid_or_expired",
            OtpErrorKind::MaxAttemptsExceeded => "max_attempts_exceeded",
        }
    }
}

impl fmt::Display for OtpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by OTP store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness or conditional constraint was violated.
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Query or write failed.
    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors reported by notification channel adapters.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Recipient rejected by the provider.
    #[error("Recipient rejected: {0}")]
    Rejected(String),

    /// Provider unreachable or returned a transport failure.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}
