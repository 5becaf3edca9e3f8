// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::{AppError, Result};

/// Resolve a potentially relative href against a base URL.
///
/// Returns `None` when the href cannot be joined.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// Extract the lowercased host from a URL string.
///
/// # Examples
/// ```
/// use sitecrawl::utils::url::host_of;
///
/// assert_eq!(host_of("https://Example.COM/path"), Some("example.com".to_string()));
/// assert_eq!(host_of("not a url"), None);
/// ```
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Canonical dedup key for a URL.
///
/// Keeps scheme, host, port and path; drops query, fragment and userinfo;
/// lowercases everything and trims one trailing slash, so the site root
/// becomes `scheme://host`.
///
/// # Examples
/// ```
/// use sitecrawl::utils::url::normalize_url;
///
/// assert_eq!(normalize_url("https://Blog.dev/Path/?q=1#top").unwrap(), "https://blog.dev/path");
/// assert_eq!(normalize_url("http://a.test/").unwrap(), "http://a.test");
/// ```
pub fn normalize_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::Url(url::ParseError::EmptyHost))?;

    let mut normalized = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        normalized.push_str(&format!(":{port}"));
    }
    normalized.push_str(parsed.path());

    let mut normalized = normalized.to_lowercase();
    if normalized.ends_with('/') {
        normalized.pop();
    }
    Ok(normalized)
}
