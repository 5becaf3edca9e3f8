// src/services/links.rs

//! Outbound link extraction.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::services::parse_selector;
use crate::utils::url::resolve;

/// Href prefixes that never point at a crawlable page.
const SKIPPED_SCHEMES: [&str; 4] = ["mailto:", "tel:", "javascript:", "data:"];

/// Extract every `<a href>` target in `html` as an absolute http(s) URL.
///
/// Relative hrefs are resolved against `base`. Fragment-only links and
/// non-page schemes are skipped. Duplicates are kept; the ledger counts them.
pub fn extract_links(html: &str, base: &Url) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let anchor = parse_selector("a[href]")?;

    let links = document
        .select(&anchor)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
        })
        .filter_map(|href| resolve(base, href))
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .collect();

    Ok(links)
}
