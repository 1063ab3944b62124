//! Alerts: wire types, normalization and the ledger.

/// Newest-first accepted alert collection.
pub mod ledger;
/// Identity and timestamp assignment.
pub mod normalizer;
/// Alert, candidate, type and severity definitions.
pub mod types;

pub use ledger::{AlertLedger, LedgerSummary};
pub use normalizer::AlertNormalizer;
pub use types::{Alert, AlertDetails, AlertType, CandidateAlert, Severity};
