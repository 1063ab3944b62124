//! Observed competitor state at one point in time.
//!
//! A `Snapshot` is immutable once created. The engine never diffs snapshots
//! itself; it hands the previous one to the observation provider and stores
//! whatever comes back.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-page facts captured for a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub h1: String,
    /// Structured-data types (`LocalBusiness`, `FAQPage`, ...) found on the page.
    #[serde(default)]
    pub schema_types: BTreeSet<String>,
}

impl PageRecord {
    /// Creates a page record with only a URL set.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            meta_description: String::new(),
            h1: String::new(),
            schema_types: BTreeSet::new(),
        }
    }

    /// Sets the page title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Google Business Profile figures for a competitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbpData {
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub last_post_date: Option<String>,
}

/// A captured state of a competitor's observable surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub domain: String,
    pub taken_at: DateTime<Utc>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
    #[serde(default)]
    pub gbp_data: GbpData,
    #[serde(default)]
    pub estimated_backlinks: u64,
}

impl Snapshot {
    /// Creates an empty snapshot for `domain` taken at `taken_at`.
    #[must_use]
    pub fn empty(domain: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            domain: domain.into(),
            taken_at,
            pages: Vec::new(),
            gbp_data: GbpData::default(),
            estimated_backlinks: 0,
        }
    }

    /// Looks up a page by exact URL.
    #[must_use]
    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|p| p.url == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_names_are_camel_case() {
        let mut snap = Snapshot::empty("acme.com", Utc::now());
        snap.pages.push(PageRecord::new("https://acme.com/").with_title("Acme"));
        snap.gbp_data.review_count = 12;

        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("takenAt").is_some());
        assert!(json.get("estimatedBacklinks").is_some());
        assert_eq!(json["gbpData"]["reviewCount"], 12);
        assert!(json["pages"][0].get("metaDescription").is_some());
        assert!(json["pages"][0].get("schemaTypes").is_some());
    }

    #[test]
    fn test_page_record_optional_fields_default() {
        let page: PageRecord = serde_json::from_str(r#"{"url":"https://acme.com/a"}"#).unwrap();
        assert_eq!(page.url, "https://acme.com/a");
        assert!(page.title.is_empty());
        assert!(page.schema_types.is_empty());
    }

    #[test]
    fn test_page_lookup() {
        let mut snap = Snapshot::empty("acme.com", Utc::now());
        snap.pages.push(PageRecord::new("https://acme.com/a"));
        assert!(snap.page("https://acme.com/a").is_some());
        assert!(snap.page("https://acme.com/b").is_none());
    }
}
