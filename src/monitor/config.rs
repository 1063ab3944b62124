//! Orchestrator configuration.

use std::time::Duration;

use crate::error::ValidationError;

/// Configuration for [`MonitorService`](super::MonitorService).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Per-competitor observation budget. `None` runs the provider inline
    /// with no bound.
    pub provider_timeout: Option<Duration>,
    /// Name prefix for observation worker threads.
    pub worker_thread_name: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Some(Duration::from_secs(60)),
            worker_thread_name: "rivalwatch-observe".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Validates the configuration.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.provider_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ValidationError::InvalidConfig {
                reason: "provider_timeout must be non-zero (use None to disable)".to_string(),
            });
        }
        if self.worker_thread_name.trim().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "worker_thread_name cannot be empty".to_string(),
            });
        }
        Ok(self)
    }

    /// Sets the per-competitor timeout.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cfg = MonitorConfig::default().with_provider_timeout(Some(Duration::ZERO));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_no_timeout_allowed() {
        let cfg = MonitorConfig::default().with_provider_timeout(None);
        assert!(cfg.validate().is_ok());
    }
}
