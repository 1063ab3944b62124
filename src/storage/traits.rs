//! Abstract state storage.
//!
//! The engine persists a single record, the whole [`StoredState`], under a
//! fixed key. Backends only need to read and replace that record atomically.

use thiserror::Error;

use crate::state::StoredState;

/// Fixed key under which the aggregate is stored.
pub const STORAGE_KEY: &str = "competitor-monitor-state";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored record failed integrity checks.
    #[error("Stored state is corrupted: {0}")]
    Corrupted(String),

    /// Record written by a newer engine.
    #[error("Unsupported schema version {found} (this build supports up to {supported})")]
    UnsupportedSchema {
        found: u32,
        supported: u32,
    },

    /// Another process holds the state directory.
    #[error("Monitor state is locked by another process: {}", .0.display())]
    Locked(std::path::PathBuf),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for the root aggregate.
///
/// # Contract
/// - `load` returns `Ok(None)` when nothing has been persisted yet
/// - `save` replaces the whole record; a failed save leaves the previous
///   record intact
pub trait StateStore: Send + Sync {
    /// Reads the persisted aggregate, if any.
    fn load(&self) -> Result<Option<StoredState>, StorageError>;

    /// Replaces the persisted aggregate.
    fn save(&self, state: &StoredState) -> Result<(), StorageError>;
}

impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<StoredState>, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        (**self).save(state)
    }
}
