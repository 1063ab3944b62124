//! Monitoring orchestrator.
//!
//! Runs check cycles across competitors and exposes the operator mutations
//! the presentation layer calls.

/// Orchestrator configuration.
pub mod config;
/// Per-competitor outcomes and cycle reports.
pub mod report;
/// The orchestrator service.
pub mod service;

pub use config::MonitorConfig;
pub use report::{CompetitorOutcome, CycleReport};
pub use service::MonitorService;
