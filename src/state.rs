//! The persisted root aggregate.
//!
//! `StoredState` is loaded once, mutated in memory and rewritten whole after
//! every mutation. There is no partial persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::AlertLedger;
use crate::competitor::Competitor;
use crate::preferences::Preferences;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

const fn legacy_schema_version() -> u32 {
    1
}

/// Root aggregate for the monitoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    /// Records written before versioning existed carry no field and are v1.
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub alerts: AlertLedger,
    #[serde(default)]
    pub preferences: Preferences,
    pub last_full_check: DateTime<Utc>,
}

impl StoredState {
    /// Default state: nothing monitored, every toggle on.
    #[must_use]
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            competitors: Vec::new(),
            alerts: AlertLedger::new(),
            preferences: Preferences::default(),
            last_full_check: now,
        }
    }

    /// Looks up a competitor by normalized domain.
    #[must_use]
    pub fn competitor(&self, domain: &str) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.domain == domain)
    }

    /// Mutable lookup by normalized domain.
    pub fn competitor_mut(&mut self, domain: &str) -> Option<&mut Competitor> {
        self.competitors.iter_mut().find(|c| c.domain == domain)
    }

    /// Appends a new active competitor. Returns false if already present.
    pub fn add_competitor(&mut self, domain: &str) -> bool {
        if self.competitor(domain).is_some() {
            return false;
        }
        self.competitors.push(Competitor::new(domain));
        true
    }

    /// Removes a competitor. Its alerts stay in the ledger.
    pub fn remove_competitor(&mut self, domain: &str) -> bool {
        let before = self.competitors.len();
        self.competitors.retain(|c| c.domain != domain);
        self.competitors.len() != before
    }
}
