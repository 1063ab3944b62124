//! # Rivalwatch - competitor monitoring engine
//!
//! Rivalwatch periodically inspects competitor web properties through a
//! pluggable observation provider, keeps a bounded snapshot history per
//! competitor, and turns detected changes into prioritized alerts for an
//! operator.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: captured state of a competitor at one point in time
//! - **Observation provider**: external collaborator that returns a fresh
//!   snapshot plus candidate alerts, given the previous snapshot
//! - **Ledger**: newest-first collection of accepted alerts
//! - **Cycle**: one pass of the orchestrator over all active competitors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rivalwatch::{InMemoryStateStore, MonitorConfig, MonitorService, PreferenceKey};
//!
//! let service = MonitorService::open(
//!     Arc::new(InMemoryStateStore::new()),
//!     Arc::new(my_provider),
//!     MonitorConfig::default(),
//! )?;
//! service.add_competitor("https://www.acme.com")?;
//! service.set_preference(PreferenceKey::Titles, false)?;
//!
//! let report = service.run_cycle()?;
//! println!(
//!     "{} new alerts, {} competitors failed",
//!     report.new_alerts.len(),
//!     report.failed_count(),
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod alert;
pub mod competitor;
pub mod domain;
pub mod error;
pub mod preferences;
pub mod snapshot;
pub mod state;

// Boundaries and orchestration
pub mod monitor;
pub mod provider;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use alert::{
    Alert, AlertDetails, AlertLedger, AlertNormalizer, AlertType, CandidateAlert, Severity,
};
pub use competitor::{Competitor, SNAPSHOT_HISTORY_LIMIT};
pub use domain::{DefaultDomainNormalizer, DomainNormalizer};
pub use error::{MonitorError, MonitorResult, ProviderError, ValidationError};
pub use monitor::{CompetitorOutcome, CycleReport, MonitorConfig, MonitorService};
pub use preferences::{PreferenceKey, Preferences};
pub use provider::{Observation, ObservationProvider};
pub use snapshot::{GbpData, PageRecord, Snapshot};
pub use state::{StoredState, SCHEMA_VERSION};
pub use storage::{InMemoryStateStore, StateStore, StorageError, STORAGE_KEY};
