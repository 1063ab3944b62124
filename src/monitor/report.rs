//! Cycle reports.
//!
//! A cycle never fails as a whole because one competitor did. Each competitor
//! gets its own outcome and the caller decides how to surface failures.

use chrono::{DateTime, Utc};

use crate::alert::Alert;
use crate::error::ProviderError;

/// What happened to one competitor during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CompetitorOutcome {
    /// Observation succeeded and was applied.
    Checked {
        domain: String,
        /// Alerts that passed the preference filter.
        accepted: usize,
        /// Alerts dropped by the preference filter.
        suppressed: usize,
        /// True if this check established the first snapshot.
        baseline: bool,
    },
    /// Observation failed; the competitor's state is untouched.
    Failed {
        domain: String,
        error: ProviderError,
    },
    /// Competitor was removed while its observation was in flight.
    Discarded {
        domain: String,
    },
}

impl CompetitorOutcome {
    /// Domain this outcome belongs to.
    #[must_use]
    pub fn domain(&self) -> &str {
        match self {
            Self::Checked { domain, .. }
            | Self::Failed { domain, .. }
            | Self::Discarded { domain } => domain.as_str(),
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a monitoring cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Alerts accepted during this cycle, newest first.
    pub new_alerts: Vec<Alert>,
    /// One entry per competitor considered, in processing order.
    pub outcomes: Vec<CompetitorOutcome>,
}

impl CycleReport {
    /// Number of competitors whose observation failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    /// Number of competitors whose observation was applied.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CompetitorOutcome::Checked { .. }))
            .count()
    }

    /// Failed competitors with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ProviderError)> {
        self.outcomes.iter().filter_map(|o| match o {
            CompetitorOutcome::Failed { domain, error } => Some((domain.as_str(), error)),
            _ => None,
        })
    }

    /// Outcome for `domain`, if it was part of this cycle.
    #[must_use]
    pub fn outcome(&self, domain: &str) -> Option<&CompetitorOutcome> {
        self.outcomes.iter().find(|o| o.domain() == domain)
    }

    /// True if some but not all competitors failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        let failed = self.failed_count();
        failed > 0 && failed < self.outcomes.len()
    }
}
