//! Alert and candidate-alert types.
//!
//! `CandidateAlert` is what the observation provider proposes. `Alert` is what
//! the ledger stores after normalization assigned it an identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category of a detected change.
///
/// Built-in categories serialize as their snake_case wire names. Any other
/// non-empty string is preserved as [`AlertType::Custom`] so provider-invented
/// categories survive the round trip instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlertType {
    NewPage,
    TitleChange,
    MetaChange,
    ReviewChange,
    RatingChange,
    GbpPost,
    NewBacklink,
    SchemaChange,
    /// First observation of a competitor; nothing to compare against.
    Baseline,
    Custom(String),
}

impl AlertType {
    /// All built-in categories.
    pub const BUILT_IN: [Self; 9] = [
        Self::NewPage,
        Self::TitleChange,
        Self::MetaChange,
        Self::ReviewChange,
        Self::RatingChange,
        Self::GbpPost,
        Self::NewBacklink,
        Self::SchemaChange,
        Self::Baseline,
    ];

    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NewPage => "new_page",
            Self::TitleChange => "title_change",
            Self::MetaChange => "meta_change",
            Self::ReviewChange => "review_change",
            Self::RatingChange => "rating_change",
            Self::GbpPost => "gbp_post",
            Self::NewBacklink => "new_backlink",
            Self::SchemaChange => "schema_change",
            Self::Baseline => "baseline",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Default operator guidance used when the provider supplies none.
    #[must_use]
    pub fn default_response(&self) -> &'static str {
        match self {
            Self::NewPage => "Review the new page and decide whether to publish competing content.",
            Self::TitleChange => {
                "Compare the new title against your ranking page for the same intent."
            }
            Self::MetaChange => {
                "Check whether the new meta description targets keywords you rank for."
            }
            Self::ReviewChange => {
                "Follow up with recent customers to keep review velocity competitive."
            }
            Self::RatingChange => {
                "Monitor the rating trend and respond to new reviews on your profile."
            }
            Self::GbpPost => "Consider publishing a Business Profile post on the same topic.",
            Self::NewBacklink => "Investigate the referring site for outreach opportunities.",
            Self::SchemaChange => "Audit your structured data for the same page types.",
            Self::Baseline => "Baseline captured. Future checks will report changes.",
            Self::Custom(_) => "Review this change.",
        }
    }
}

impl TryFrom<String> for AlertType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("alert type cannot be empty".to_string());
        }
        if let Some(known) = Self::BUILT_IN.iter().find(|t| t.as_str() == trimmed) {
            return Ok(known.clone());
        }
        Ok(Self::Custom(trimmed.to_string()))
    }
}

impl From<AlertType> for String {
    fn from(value: AlertType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// What changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_text")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_text")]
    pub new_value: Option<String>,
    /// Numeric delta (review count, rating, backlinks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

/// Accepts a string, number or bool and keeps its text form.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, number or bool, got {other}"
        ))),
    }
}

/// An unvalidated change record proposed by the observation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAlert {
    /// Provider-side id. Never trusted; normalization replaces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    #[serde(default)]
    pub details: AlertDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_response: Option<String>,
}

impl CandidateAlert {
    /// Creates a candidate with empty details.
    #[must_use]
    pub fn new(alert_type: AlertType, severity: Severity) -> Self {
        Self {
            id: None,
            alert_type,
            severity,
            details: AlertDetails::default(),
            detected_at: None,
            recommended_response: None,
        }
    }

    /// Creates the candidate a provider returns for a baseline request.
    #[must_use]
    pub fn baseline() -> Self {
        Self::new(AlertType::Baseline, Severity::Low)
    }

    /// Sets the affected URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.details.url = Some(url.into());
        self
    }

    /// Sets old and new values.
    #[must_use]
    pub fn with_change(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.details.old_value = Some(old.into());
        self.details.new_value = Some(new.into());
        self
    }

    /// Sets the provider-side id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// An accepted alert stored in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    /// Domain of the competitor that produced this alert.
    pub competitor: String,
    #[serde(default)]
    pub details: AlertDetails,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub recommended_response: String,
    #[serde(default)]
    pub addressed: bool,
}
