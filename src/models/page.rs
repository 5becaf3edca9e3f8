//! Visit record and page attribute data structures.

use serde::{Deserialize, Serialize};

/// Attributes extracted from a fetched page.
///
/// Every field is empty when the page does not declare it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keywords: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub canonical: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub charset: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub og_image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub og_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub og_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub og_site_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter_card: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter_site: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter_image: String,
}

/// Improvement suggestions returned by a content analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestions {
    #[serde(default)]
    pub seo: Vec<String>,
    #[serde(default)]
    pub content_quality: Vec<String>,
    #[serde(default)]
    pub accessibility: Vec<String>,
    #[serde(default)]
    pub performance: Vec<String>,
}

/// Ledger entry for one normalized URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitRecord {
    /// Times this URL was seen as a crawl candidate
    pub count: usize,
    pub metadata: PageMetadata,
    pub suggestions: Option<Suggestions>,
}

impl VisitRecord {
    /// Record for a first sighting.
    pub fn first_sighting() -> Self {
        Self {
            count: 1,
            ..Self::default()
        }
    }
}

/// One row of the final report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageReport {
    pub url: String,
    pub count: usize,
    #[serde(flatten)]
    pub metadata: PageMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Suggestions>,
}

impl PageReport {
    pub fn new(url: impl Into<String>, record: VisitRecord) -> Self {
        Self {
            url: url.into(),
            count: record.count,
            metadata: record.metadata,
            suggestions: record.suggestions,
        }
    }
}
