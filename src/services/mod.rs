//! Collaborators the crawl engine calls out to.
//!
//! - Page and robots.txt fetching (`PageFetcher`, `HttpFetcher`)
//! - Outbound link extraction (`extract_links`)
//! - Page attribute extraction (`extract_metadata`)
//! - AI content suggestions (`ContentAnalyzer`, `AiAnalyzer`)

mod analyzer;
mod fetcher;
mod links;
mod metadata;

pub use analyzer::{AiAnalyzer, parse_suggestions, select_provider};
pub use fetcher::HttpFetcher;
pub use links::extract_links;
pub use metadata::extract_metadata;

use async_trait::async_trait;
use scraper::Selector;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Suggestions;

/// Source of page bodies.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the HTML body of `url`. Any error ends that branch of the crawl.
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// Fetch `/robots.txt` for the seed's origin.
    ///
    /// `None` covers every failure, including non-200 responses.
    async fn fetch_robots(&self, seed: &Url) -> Option<String>;
}

/// Source of content-improvement suggestions for a page.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, url: &str, title: &str, description: &str) -> Result<Suggestions>;
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("a[href]").is_ok());
        assert!(parse_selector(r#"script[type="application/ld+json"]"#).is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
