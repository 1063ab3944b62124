//! Domain normalization.
//!
//! Competitors are keyed by a canonical domain form. The normalizer is a
//! collaborator so hosts with stricter rules (public-suffix handling, IDN)
//! can swap in their own.

use std::sync::OnceLock;

use regex::Regex;

/// Converts operator input into the canonical competitor key.
pub trait DomainNormalizer: Send + Sync {
    /// Returns the canonical form of `input`. May be empty for unusable input.
    fn normalize(&self, input: &str) -> String;
}

/// Default normalizer.
///
/// Strips scheme, credentials, a leading `www.`, port, path, query and
/// fragment, then lowercases.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDomainNormalizer;

fn scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme pattern is valid"))
}

impl DomainNormalizer for DefaultDomainNormalizer {
    fn normalize(&self, input: &str) -> String {
        let trimmed = input.trim();
        let without_scheme = scheme_re().replace(trimmed, "");

        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = host.rsplit('@').next().unwrap_or_default();
        let host = host.split(':').next().unwrap_or_default();

        let host = host.trim_end_matches('.').to_ascii_lowercase();
        match host.strip_prefix("www.") {
            Some(rest) => rest.to_string(),
            None => host,
        }
    }
}
