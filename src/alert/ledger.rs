//! Alert ledger.
//!
//! Accepted alerts, newest first. Alerts are never removed; the only
//! mutation after acceptance is marking one as addressed.

use serde::{Deserialize, Serialize};

use super::types::{Alert, Severity};

/// Newest-first collection of accepted alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertLedger {
    alerts: Vec<Alert>,
}

/// Alert counts for badges and dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total: usize,
    pub unaddressed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AlertLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self { alerts: Vec::new() }
    }

    /// Prepends a batch so it sits ahead of everything already stored.
    ///
    /// The batch keeps its own internal order.
    pub fn prepend(&mut self, batch: Vec<Alert>) {
        if batch.is_empty() {
            return;
        }
        let mut merged = batch;
        merged.reserve(self.alerts.len());
        merged.append(&mut self.alerts);
        self.alerts = merged;
    }

    /// Marks the alert with `id` as addressed.
    ///
    /// Returns true if the alert exists. Unknown ids are a no-op.
    pub fn mark_addressed(&mut self, id: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.addressed = true;
                true
            }
            None => false,
        }
    }

    /// Looks up an alert by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// All alerts, newest first.
    #[must_use]
    pub fn as_slice(&self) -> &[Alert] {
        &self.alerts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alerts still awaiting operator action.
    pub fn unaddressed(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.addressed)
    }

    /// Alerts produced by one competitor.
    pub fn for_competitor<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a Alert> {
        self.alerts.iter().filter(move |a| a.competitor == domain)
    }

    /// Counts by addressed state and severity.
    #[must_use]
    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total: self.alerts.len(),
            ..LedgerSummary::default()
        };
        for alert in &self.alerts {
            if !alert.addressed {
                summary.unaddressed += 1;
            }
            match alert.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }
        summary
    }
}
