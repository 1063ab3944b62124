//! Checksummed single-record JSON file store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

use crate::state::{StoredState, SCHEMA_VERSION};
use crate::storage::codec::{check_schema, decode_state, encode_state};
use crate::storage::traits::{StateStore, StorageError, STORAGE_KEY};

use super::PersistentConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a> {
    schema_version: u32,
    checksum: u32,
    state: &'a RawValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeIn<'a> {
    schema_version: u32,
    checksum: u32,
    #[serde(borrow)]
    state: &'a RawValue,
}

fn checksum(text: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(text.as_bytes());
    hasher.finalize()
}

/// Takes a non-blocking exclusive lock, released when `file` is closed.
#[cfg(unix)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` for the duration of the call.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        return Err(ErrorKind::WouldBlock.into());
    }
    Err(err)
}

#[cfg(windows)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Foundation::HANDLE;
    use windows_sys::Win32::Storage::FileSystem::{
        LockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
    };
    use windows_sys::Win32::System::IO::OVERLAPPED;

    // SAFETY: the handle is owned by `file`; OVERLAPPED is plain data.
    let locked = unsafe {
        let mut overlapped = std::mem::zeroed::<OVERLAPPED>();
        LockFileEx(
            file.as_raw_handle() as HANDLE,
            LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
            0,
            1,
            0,
            &mut overlapped,
        )
    };
    if locked == 0 {
        return Err(ErrorKind::WouldBlock.into());
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn lock_exclusive(_file: &File) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        "file locking not supported on this platform",
    ))
}

/// File-backed [`StateStore`] holding an exclusive directory lock.
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    config: PersistentConfig,
    write_guard: Mutex<()>,
    _lock_file: File,
}

impl FileStateStore {
    /// Opens (creating if needed) the store in `dir`.
    ///
    /// # Errors
    /// [`StorageError::Locked`] if another process already has `dir` open.
    pub fn open(dir: &Path, config: PersistentConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let lock_path = dir.join(format!("{STORAGE_KEY}.lock"));
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        lock_exclusive(&lock_file).map_err(|e| match e.kind() {
            ErrorKind::WouldBlock => StorageError::Locked(lock_path),
            _ => StorageError::Io(e),
        })?;

        Ok(Self {
            path: dir.join(format!("{STORAGE_KEY}.json")),
            config,
            write_guard: Mutex::new(()),
            _lock_file: lock_file,
        })
    }

    /// Path of the state record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, text: &str) -> Result<StoredState, StorageError> {
        let Ok(envelope) = serde_json::from_str::<EnvelopeIn<'_>>(text) else {
            // Bare aggregate written before the envelope existed.
            return decode_state(text);
        };

        check_schema(envelope.schema_version)?;
        let state_text = envelope.state.get();
        if self.config.verify_checksum {
            let computed = checksum(state_text);
            if computed != envelope.checksum {
                return Err(StorageError::Corrupted(format!(
                    "checksum mismatch: stored={:08x}, computed={computed:08x}",
                    envelope.checksum
                )));
            }
        }
        decode_state(state_text)
    }

    fn encode(state: &StoredState) -> Result<Vec<u8>, StorageError> {
        let state_text = encode_state(state)?;
        let raw = RawValue::from_string(state_text)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let envelope = EnvelopeOut {
            schema_version: SCHEMA_VERSION,
            checksum: checksum(raw.get()),
            state: &raw,
        };
        serde_json::to_vec(&envelope).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<StoredState>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.decode(&text).map(Some)
    }

    fn save(&self, state: &StoredState) -> Result<(), StorageError> {
        let bytes = Self::encode(state)?;
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| StorageError::Backend("poisoned lock: write_guard".to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            if self.config.sync_on_write {
                file.sync_all()?;
            }
        }
        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted monitor state");
        Ok(())
    }
}
