//! Error types for the monitoring engine.
//!
//! All errors are strongly typed using thiserror. Provider failures are
//! scoped to a single competitor and recovered by the orchestrator; storage
//! failures are fatal for the operation that hit them and always reach the
//! caller.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors raised for operator input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Domain '{input}' is empty after normalization")]
    EmptyDomain {
        input: String,
    },

    #[error("Unknown preference key: {key}")]
    UnknownPreference {
        key: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Failures of a single observation call.
///
/// These never abort a cycle. The orchestrator records them against the
/// competitor and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider transport failed: {message}")]
    Transport {
        message: String,
    },

    #[error("Provider returned a malformed response: {reason}")]
    MalformedResponse {
        reason: String,
    },

    #[error("Observation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Observation worker disconnected before replying")]
    Disconnected,

    #[error("Provider panicked: {message}")]
    Panicked {
        message: String,
    },

    #[error("A timed-out observation of this competitor is still running")]
    StillRunning,
}

impl ProviderError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// Top-level error type for the monitoring engine.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),

    #[error("A monitoring cycle is already in progress")]
    CycleInProgress,

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl MonitorError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a provider error.
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Returns true if this is a persistence error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Provider(e) => !matches!(
                e,
                ProviderError::MalformedResponse { .. } | ProviderError::Panicked { .. }
            ),
            Self::Storage(e) => matches!(e, StorageError::Io(_) | StorageError::Backend(_)),
            Self::CycleInProgress => true,
        }
    }
}

/// Result type alias for engine operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
