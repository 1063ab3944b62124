//! JSON boundary for observation providers.
//!
//! Providers backed by an AI service or a remote crawler speak JSON. This
//! module builds the request, and validates the response against the strict
//! [`Observation`] schema before anything reaches the engine. A response that
//! fails validation is a [`ProviderError::MalformedResponse`] and nothing from
//! it is applied.

use serde::Serialize;

use crate::error::ProviderError;
use crate::snapshot::Snapshot;

use super::{validate_observation, Observation, ObservationProvider};

/// Request body sent to a JSON provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRequest<'a> {
    pub domain: &'a str,
    pub previous_snapshot: Option<&'a Snapshot>,
}

/// Moves request text to a provider and returns its response text.
pub trait JsonTransport: Send + Sync {
    /// Performs one exchange.
    fn exchange(&self, request: &str) -> Result<String, ProviderError>;
}

/// Parses and validates a provider response for `domain`.
///
/// Tolerates a surrounding Markdown code fence, which language-model
/// backends often emit.
pub fn parse_observation(domain: &str, text: &str) -> Result<Observation, ProviderError> {
    let body = strip_code_fence(text);
    let observation: Observation = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(format!("invalid observation JSON: {e}")))?;

    validate_observation(domain, &observation)?;
    Ok(observation)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// [`ObservationProvider`] speaking JSON over a [`JsonTransport`].
#[derive(Debug, Clone)]
pub struct JsonObservationProvider<T> {
    transport: T,
}

impl<T: JsonTransport> JsonObservationProvider<T> {
    /// Wraps a transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: JsonTransport> ObservationProvider for JsonObservationProvider<T> {
    fn observe(
        &self,
        domain: &str,
        previous: Option<&Snapshot>,
    ) -> Result<Observation, ProviderError> {
        let request = ObservationRequest {
            domain,
            previous_snapshot: previous,
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| ProviderError::transport(format!("failed to encode request: {e}")))?;
        let response = self.transport.exchange(&body)?;
        parse_observation(domain, &response)
    }
}
