//! Observation provider boundary.
//!
//! The engine never crawls or diffs anything itself. A provider is handed a
//! competitor domain and the previous snapshot (or `None` for a baseline
//! request) and is authoritative for what changed.

/// Strict JSON request/response adapter.
pub mod json;

use serde::{Deserialize, Serialize};

use crate::alert::CandidateAlert;
use crate::error::ProviderError;
use crate::snapshot::Snapshot;

pub use json::{parse_observation, JsonObservationProvider, JsonTransport, ObservationRequest};

/// Checks an observation against the request it answers.
///
/// Applied to every provider's output, typed or JSON, before the engine
/// touches it. Ratings and deltas must be finite; JSON cannot encode the
/// others.
pub fn validate_observation(
    domain: &str,
    observation: &Observation,
) -> Result<(), ProviderError> {
    if observation.snapshot.domain != domain {
        return Err(ProviderError::malformed(format!(
            "snapshot is for '{}' but '{domain}' was requested",
            observation.snapshot.domain
        )));
    }
    let rating = observation.snapshot.gbp_data.rating;
    if !rating.is_finite() {
        return Err(ProviderError::malformed(format!(
            "gbp rating must be finite, got {rating}"
        )));
    }
    if let Some(change) = observation
        .candidates
        .iter()
        .filter_map(|c| c.details.change)
        .find(|change| !change.is_finite())
    {
        return Err(ProviderError::malformed(format!(
            "alert change must be finite, got {change}"
        )));
    }
    Ok(())
}

/// Result of one observation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub snapshot: Snapshot,
    #[serde(default, rename = "alerts", alias = "candidateAlerts")]
    pub candidates: Vec<CandidateAlert>,
}

/// Source of fresh snapshots and candidate alerts.
///
/// Implementations may block on I/O. The orchestrator calls them one
/// competitor at a time, optionally on a worker thread bounded by a timeout.
pub trait ObservationProvider: Send + Sync {
    /// Observes `domain`.
    ///
    /// `previous == None` is a baseline request and should yield a single
    /// `baseline` candidate rather than comparison alerts.
    fn observe(
        &self,
        domain: &str,
        previous: Option<&Snapshot>,
    ) -> Result<Observation, ProviderError>;
}

impl<T: ObservationProvider + ?Sized> ObservationProvider for std::sync::Arc<T> {
    fn observe(
        &self,
        domain: &str,
        previous: Option<&Snapshot>,
    ) -> Result<Observation, ProviderError> {
        (**self).observe(domain, previous)
    }
}
