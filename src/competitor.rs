//! Competitors and their bounded snapshot history.
//!
//! Each competitor keeps at most [`SNAPSHOT_HISTORY_LIMIT`] snapshots ordered
//! oldest to newest. Appending past the limit evicts the oldest entry, so only
//! the immediately previous state is ever available for comparison.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Maximum number of snapshots retained per competitor.
pub const SNAPSHOT_HISTORY_LIMIT: usize = 2;

/// A monitored competitor, keyed by normalized domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub domain: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    snapshots: VecDeque<Snapshot>,
}

const fn default_active() -> bool {
    true
}

impl Competitor {
    /// Creates an active competitor with no history.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            active: true,
            snapshots: VecDeque::with_capacity(SNAPSHOT_HISTORY_LIMIT),
        }
    }

    /// Appends a snapshot, evicting the oldest when the history is full.
    pub fn record_snapshot(&mut self, snapshot: Snapshot) {
        while self.snapshots.len() >= SNAPSHOT_HISTORY_LIMIT {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Returns the newest snapshot, or `None` if no baseline exists yet.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Returns the snapshot before the newest one, if retained.
    #[must_use]
    pub fn previous(&self) -> Option<&Snapshot> {
        let len = self.snapshots.len();
        if len < 2 {
            return None;
        }
        self.snapshots.get(len - 2)
    }

    /// Iterates the history oldest to newest.
    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if the next check must establish a baseline.
    #[must_use]
    pub fn needs_baseline(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn snap(n: i64) -> Snapshot {
        let mut s = Snapshot::empty("acme.com", Utc::now() + Duration::seconds(n));
        s.estimated_backlinks = u64::try_from(n).unwrap();
        s
    }

    #[test]
    fn test_new_competitor_needs_baseline() {
        let c = Competitor::new("acme.com");
        assert!(c.active);
        assert!(c.needs_baseline());
        assert!(c.latest().is_none());
    }

    #[test]
    fn test_third_snapshot_evicts_first() {
        let mut c = Competitor::new("acme.com");
        c.record_snapshot(snap(1));
        c.record_snapshot(snap(2));
        c.record_snapshot(snap(3));

        let kept: Vec<u64> = c.snapshots().map(|s| s.estimated_backlinks).collect();
        assert_eq!(kept, vec![2, 3]);
        assert_eq!(c.latest().unwrap().estimated_backlinks, 3);
        assert_eq!(c.previous().unwrap().estimated_backlinks, 2);
    }

    #[test]
    fn test_single_snapshot_has_no_previous() {
        let mut c = Competitor::new("acme.com");
        c.record_snapshot(snap(1));
        assert_eq!(c.history_len(), 1);
        assert!(c.previous().is_none());
    }

    #[test]
    fn test_missing_active_defaults_true() {
        let c: Competitor = serde_json::from_str(r#"{"domain":"acme.com"}"#).unwrap();
        assert!(c.active);
        assert_eq!(c.history_len(), 0);
    }
}
