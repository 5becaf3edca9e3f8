// src/services/metadata.rs

//! Page attribute extraction.
//!
//! Reads the document head: `<html lang>`, `<title>`, canonical link, charset,
//! standard meta tags, Open Graph and Twitter cards. When no
//! `<meta name="description">` is present the description falls back to
//! `og:description`, then `twitter:description`, then the first JSON-LD block
//! that carries a `description`.

use scraper::Html;
use serde_json::Value;

use crate::error::Result;
use crate::models::PageMetadata;
use crate::services::parse_selector;

/// Extract page attributes from an HTML document.
pub fn extract_metadata(html: &str) -> Result<PageMetadata> {
    let document = Html::parse_document(html);
    let mut meta = PageMetadata::default();

    let html_sel = parse_selector("html[lang]")?;
    if let Some(root) = document.select(&html_sel).next() {
        meta.language = root.value().attr("lang").unwrap_or_default().trim().to_string();
    }

    let title_sel = parse_selector("title")?;
    if let Some(title) = document.select(&title_sel).next() {
        meta.title = collapse_whitespace(&title.text().collect::<String>());
    }

    let canonical_sel = parse_selector("link[rel][href]")?;
    if let Some(link) = document.select(&canonical_sel).find(|el| {
        el.value()
            .attr("rel")
            .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
    }) {
        meta.canonical = link.value().attr("href").unwrap_or_default().to_string();
    }

    let mut og_description = String::new();
    let mut twitter_description = String::new();

    let meta_sel = parse_selector("meta")?;
    for element in document.select(&meta_sel) {
        let attrs = element.value();
        if let Some(charset) = attrs.attr("charset") {
            meta.charset = charset.trim().to_string();
        }

        let content = attrs.attr("content").unwrap_or_default().trim().to_string();
        let name = attrs.attr("name").unwrap_or_default().to_ascii_lowercase();
        let property = attrs.attr("property").unwrap_or_default().to_ascii_lowercase();

        match name.as_str() {
            "description" => meta.description = content.clone(),
            "keywords" => meta.keywords = content.clone(),
            "author" => meta.author = content.clone(),
            "twitter:description" => twitter_description = content.clone(),
            "twitter:card" => meta.twitter_card = content.clone(),
            "twitter:site" => meta.twitter_site = content.clone(),
            "twitter:image" => meta.twitter_image = content.clone(),
            _ => {}
        }

        match property.as_str() {
            "og:description" => og_description = content,
            "og:image" => meta.og_image = content,
            "og:type" => meta.og_type = content,
            "og:url" => meta.og_url = content,
            "og:site_name" => meta.og_site_name = content,
            _ => {}
        }
    }

    if meta.description.is_empty() {
        meta.description = [og_description, twitter_description]
            .into_iter()
            .find(|d| !d.is_empty())
            .or_else(|| json_ld_description(&document))
            .unwrap_or_default();
    }

    Ok(meta)
}

/// First `description` found in an `application/ld+json` block.
fn json_ld_description(document: &Html) -> Option<String> {
    let script_sel = parse_selector(r#"script[type="application/ld+json"]"#).ok()?;
    document
        .select(&script_sel)
        .filter_map(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
        .find_map(|value| find_description(&value))
}

fn find_description(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.trim().to_string())
            .or_else(|| map.get("@graph").and_then(find_description)),
        Value::Array(items) => items.iter().find_map(find_description),
        _ => None,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_head() {
        let html = r#"<!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="utf-8">
            <title>  Boot.dev
                Blog </title>
            <link rel="canonical" href="https://blog.boot.dev/">
            <meta name="description" content="Learn backend development">
            <meta name="keywords" content="go, python">
            <meta name="author" content="Lane">
            <meta property="og:image" content="https://blog.boot.dev/og.png">
            <meta property="og:type" content="website">
            <meta property="og:url" content="https://blog.boot.dev">
            <meta property="og:site_name" content="Boot.dev">
            <meta name="twitter:card" content="summary">
            <meta name="twitter:site" content="@bootdotdev">
            <meta name="twitter:image" content="https://blog.boot.dev/tw.png">
        </head>
        <body></body>
        </html>"#;

        let meta = extract_metadata(html).unwrap();
        assert_eq!(meta.language, "en");
        assert_eq!(meta.charset, "utf-8");
        assert_eq!(meta.title, "Boot.dev Blog");
        assert_eq!(meta.canonical, "https://blog.boot.dev/");
        assert_eq!(meta.description, "Learn backend development");
        assert_eq!(meta.keywords, "go, python");
        assert_eq!(meta.author, "Lane");
        assert_eq!(meta.og_image, "https://blog.boot.dev/og.png");
        assert_eq!(meta.og_type, "website");
        assert_eq!(meta.og_url, "https://blog.boot.dev");
        assert_eq!(meta.og_site_name, "Boot.dev");
        assert_eq!(meta.twitter_card, "summary");
        assert_eq!(meta.twitter_site, "@bootdotdev");
        assert_eq!(meta.twitter_image, "https://blog.boot.dev/tw.png");
    }

    #[test]
    fn test_description_prefers_og_over_twitter() {
        let html = r#"<head>
            <meta name="twitter:description" content="from twitter">
            <meta property="og:description" content="from og">
        </head>"#;
        assert_eq!(extract_metadata(html).unwrap().description, "from og");
    }

    #[test]
    fn test_description_falls_back_to_twitter() {
        let html = r#"<head><meta name="twitter:description" content="from twitter"></head>"#;
        assert_eq!(extract_metadata(html).unwrap().description, "from twitter");
    }

    #[test]
    fn test_description_falls_back_to_json_ld() {
        let html = r#"<head>
            <script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
                {"@type": "WebSite", "name": "x"},
                {"@type": "Article", "description": "from json-ld"}
            ]}
            </script>
        </head>"#;
        assert_eq!(extract_metadata(html).unwrap().description, "from json-ld");
    }

    #[test]
    fn test_malformed_json_ld_ignored() {
        let html = r#"<head><script type="application/ld+json">{"description": </script></head>"#;
        assert_eq!(extract_metadata(html).unwrap().description, "");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract_metadata("").unwrap(), PageMetadata::default());
    }
}
