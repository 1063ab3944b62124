//! Operator preferences and the preference filter.
//!
//! Each built-in alert type maps to exactly one toggle family. `baseline` and
//! provider-invented types have no family and are never filtered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertType};
use crate::error::ValidationError;

/// Named preference toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceKey {
    #[serde(rename = "monitorNewPages")]
    NewPages,
    #[serde(rename = "monitorTitles")]
    Titles,
    #[serde(rename = "monitorMeta")]
    Meta,
    #[serde(rename = "monitorBacklinks")]
    Backlinks,
    #[serde(rename = "monitorReviews")]
    Reviews,
    #[serde(rename = "monitorGbp")]
    Gbp,
    #[serde(rename = "monitorSchema")]
    Schema,
}

impl PreferenceKey {
    /// Every toggle.
    pub const ALL: [Self; 7] = [
        Self::NewPages,
        Self::Titles,
        Self::Meta,
        Self::Backlinks,
        Self::Reviews,
        Self::Gbp,
        Self::Schema,
    ];

    /// Wire name of the toggle.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewPages => "monitorNewPages",
            Self::Titles => "monitorTitles",
            Self::Meta => "monitorMeta",
            Self::Backlinks => "monitorBacklinks",
            Self::Reviews => "monitorReviews",
            Self::Gbp => "monitorGbp",
            Self::Schema => "monitorSchema",
        }
    }

    /// The toggle governing `alert_type`, or `None` if it is always shown.
    #[must_use]
    pub const fn governing(alert_type: &AlertType) -> Option<Self> {
        match alert_type {
            AlertType::NewPage => Some(Self::NewPages),
            AlertType::TitleChange => Some(Self::Titles),
            AlertType::MetaChange => Some(Self::Meta),
            AlertType::ReviewChange | AlertType::RatingChange => Some(Self::Reviews),
            AlertType::GbpPost => Some(Self::Gbp),
            AlertType::NewBacklink => Some(Self::Backlinks),
            AlertType::SchemaChange => Some(Self::Schema),
            AlertType::Baseline | AlertType::Custom(_) => None,
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownPreference { key: s.to_string() })
    }
}

/// Which alert families the operator wants to see.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub monitor_new_pages: bool,
    pub monitor_titles: bool,
    pub monitor_meta: bool,
    pub monitor_backlinks: bool,
    pub monitor_reviews: bool,
    pub monitor_gbp: bool,
    pub monitor_schema: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            monitor_new_pages: true,
            monitor_titles: true,
            monitor_meta: true,
            monitor_backlinks: true,
            monitor_reviews: true,
            monitor_gbp: true,
            monitor_schema: true,
        }
    }
}

impl Preferences {
    /// Reads a toggle.
    #[must_use]
    pub const fn get(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::NewPages => self.monitor_new_pages,
            PreferenceKey::Titles => self.monitor_titles,
            PreferenceKey::Meta => self.monitor_meta,
            PreferenceKey::Backlinks => self.monitor_backlinks,
            PreferenceKey::Reviews => self.monitor_reviews,
            PreferenceKey::Gbp => self.monitor_gbp,
            PreferenceKey::Schema => self.monitor_schema,
        }
    }

    /// Writes a toggle.
    pub fn set(&mut self, key: PreferenceKey, value: bool) {
        let slot = match key {
            PreferenceKey::NewPages => &mut self.monitor_new_pages,
            PreferenceKey::Titles => &mut self.monitor_titles,
            PreferenceKey::Meta => &mut self.monitor_meta,
            PreferenceKey::Backlinks => &mut self.monitor_backlinks,
            PreferenceKey::Reviews => &mut self.monitor_reviews,
            PreferenceKey::Gbp => &mut self.monitor_gbp,
            PreferenceKey::Schema => &mut self.monitor_schema,
        };
        *slot = value;
    }

    /// Returns true if alerts of `alert_type` should be kept.
    #[must_use]
    pub const fn allows(&self, alert_type: &AlertType) -> bool {
        match PreferenceKey::governing(alert_type) {
            Some(key) => self.get(key),
            None => true,
        }
    }
}

/// Keeps the alerts whose type is enabled in `preferences`, in order.
#[must_use]
pub fn filter(alerts: Vec<Alert>, preferences: &Preferences) -> Vec<Alert> {
    alerts
        .into_iter()
        .filter(|a| preferences.allows(&a.alert_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::alert::{AlertNormalizer, CandidateAlert, Severity};

    fn alerts(types: &[AlertType]) -> Vec<Alert> {
        let candidates = types
            .iter()
            .map(|t| CandidateAlert::new(t.clone(), Severity::Medium))
            .collect();
        AlertNormalizer::new().normalize("acme.com", candidates, Utc::now())
    }

    #[test]
    fn test_defaults_all_enabled() {
        let prefs = Preferences::default();
        assert!(PreferenceKey::ALL.iter().all(|k| prefs.get(*k)));
    }

    #[test]
    fn test_titles_disabled_drops_only_title_changes() {
        let mut prefs = Preferences::default();
        prefs.set(PreferenceKey::Titles, false);

        let kept = filter(alerts(&[AlertType::TitleChange, AlertType::NewPage]), &prefs);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].alert_type, AlertType::NewPage);
    }

    #[test]
    fn test_reviews_governs_review_and_rating() {
        let mut prefs = Preferences::default();
        prefs.set(PreferenceKey::Reviews, false);
        let kept = filter(
            alerts(&[AlertType::ReviewChange, AlertType::RatingChange, AlertType::GbpPost]),
            &prefs,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].alert_type, AlertType::GbpPost);
    }

    #[test]
    fn test_baseline_and_custom_always_pass() {
        let mut prefs = Preferences::default();
        for key in PreferenceKey::ALL {
            prefs.set(key, false);
        }
        let kept = filter(
            alerts(&[AlertType::Baseline, AlertType::Custom("price_change".to_string())]),
            &prefs,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_preserves_order() {
        let input = alerts(&[AlertType::SchemaChange, AlertType::Baseline, AlertType::NewBacklink]);
        let expected: Vec<String> = input.iter().map(|a| a.id.clone()).collect();
        let kept = filter(input, &Preferences::default());
        let got: Vec<String> = kept.into_iter().map(|a| a.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("monitorGbp".parse::<PreferenceKey>().unwrap(), PreferenceKey::Gbp);
        assert!("monitorPrices".parse::<PreferenceKey>().is_err());
    }

    #[test]
    fn test_missing_toggles_default_on() {
        let prefs: Preferences = serde_json::from_str(r#"{"monitorTitles": false}"#).unwrap();
        assert!(!prefs.monitor_titles);
        assert!(prefs.monitor_schema);
    }
}
