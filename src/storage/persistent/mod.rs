//! Durable file backend for the monitor state.
//!
//! The aggregate lives in `<dir>/<STORAGE_KEY>.json` as a JSON envelope:
//!
//! ```text
//! {"schemaVersion": 1, "checksum": <crc32 of state text>, "state": { ... }}
//! ```
//!
//! Writes go to a temp file that is fsynced and renamed over the record, so a
//! crash mid-write leaves the previous record readable. An exclusive lock on
//! `<dir>/<STORAGE_KEY>.lock` keeps a second process out for the lifetime of
//! the store.

mod file_store;

pub use file_store::FileStateStore;

use std::path::Path;

use super::traits::StorageError;

/// Configuration for the file backend.
#[derive(Debug, Clone)]
pub struct PersistentConfig {
    /// Whether to fsync the record before renaming it into place.
    pub sync_on_write: bool,
    /// Whether to verify the checksum on load.
    pub verify_checksum: bool,
}

impl Default for PersistentConfig {
    fn default() -> Self {
        Self {
            sync_on_write: true,
            verify_checksum: true,
        }
    }
}

/// Open or create a file-backed state store in `dir`.
///
/// # Errors
/// - If the directory cannot be created or accessed
/// - [`StorageError::Locked`] if another process holds the directory
pub fn open_state_store(
    dir: impl AsRef<Path>,
    config: Option<PersistentConfig>,
) -> Result<FileStateStore, StorageError> {
    FileStateStore::open(dir.as_ref(), config.unwrap_or_default())
}
