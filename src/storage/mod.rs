//! State persistence for the monitoring engine.
//!
//! The engine depends only on the [`StateStore`] trait. Two backends ship:
//! - [`InMemoryStateStore`] for embedded use and tests
//! - [`persistent::FileStateStore`] (feature `persistent`), a locked,
//!   checksummed JSON file

mod codec;
mod memory;
mod traits;

/// Durable file backend.
#[cfg(feature = "persistent")]
pub mod persistent;

pub use codec::{decode_state, encode_state};
pub use memory::InMemoryStateStore;
pub use traits::{StateStore, StorageError, STORAGE_KEY};

#[cfg(feature = "persistent")]
pub use persistent::{open_state_store, FileStateStore, PersistentConfig};
