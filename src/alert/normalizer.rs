//! Alert normalization.
//!
//! Turns provider candidates into ledger alerts. Ids take the form
//! `<domain>-<millis>-<seq>-<rand>`: the sequence number comes from a
//! process-wide monotonic counter and the random suffix from a v4 UUID, so two
//! normalizations in the same millisecond (or in different processes sharing
//! a state file) cannot collide. Provider-supplied ids are discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Alert, CandidateAlert};

static ALERT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Assigns identity and detection time to candidate alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertNormalizer;

impl AlertNormalizer {
    /// Creates a normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes `candidates` observed for `domain`.
    ///
    /// Order is preserved. `now` is used for both the id time component and
    /// for candidates that carry no `detectedAt` of their own.
    #[must_use]
    pub fn normalize(
        &self,
        domain: &str,
        candidates: Vec<CandidateAlert>,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        candidates
            .into_iter()
            .map(|candidate| {
                let recommended_response = candidate
                    .recommended_response
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| candidate.alert_type.default_response().to_string());
                Alert {
                    id: Self::next_id(domain, now),
                    alert_type: candidate.alert_type,
                    severity: candidate.severity,
                    competitor: domain.to_string(),
                    details: candidate.details,
                    detected_at: candidate.detected_at.unwrap_or(now),
                    recommended_response,
                    addressed: false,
                }
            })
            .collect()
    }

    fn next_id(domain: &str, now: DateTime<Utc>) -> String {
        let seq = ALERT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let rand = Uuid::new_v4().simple().to_string();
        format!("{domain}-{}-{seq}-{}", now.timestamp_millis(), &rand[..8])
    }
}
