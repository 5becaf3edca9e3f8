// src/crawl/robots.rs

//! robots.txt policy store.
//!
//! A best-effort, prefix-only matcher: `Disallow` values from every group whose
//! `User-agent` is `*` or equals the configured agent are collected into one
//! list. Wildcards and `Allow` lines are not interpreted. Rules and URL paths
//! are compared in percent-decoded form.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

/// Disallow rules for the seed host. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    disallowed: Vec<String>,
}

impl RobotsPolicy {
    /// A policy that allows everything.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse robots.txt content for `user_agent`.
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let mut disallowed = Vec::new();
        let mut agent_matches = false;

        for line in content.lines() {
            let line = match line.find('#') {
                Some(idx) => &line[..idx],
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "user-agent" => {
                    agent_matches = value == "*" || value.eq_ignore_ascii_case(user_agent);
                }
                "disallow" if agent_matches && !value.is_empty() => {
                    disallowed.push(decode(value).into_owned());
                }
                _ => {}
            }
        }

        Self { disallowed }
    }

    /// Build from an optional robots.txt body; absence allows everything.
    pub fn from_fetched(content: Option<&str>, user_agent: &str) -> Self {
        content
            .map(|body| Self::parse(body, user_agent))
            .unwrap_or_default()
    }

    /// Whether `url` may be crawled. Unparseable URLs are not allowed.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let path = match parsed.path() {
            "" => Cow::Borrowed("/"),
            path => decode(path),
        };
        !self
            .disallowed
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Collected disallow prefixes, in file order.
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    pub fn is_empty(&self) -> bool {
        self.disallowed.is_empty()
    }
}

fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}
