// src/services/fetcher.rs

//! HTTP page fetcher.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::PageFetcher;
use crate::utils::http::{create_async_client, is_html_content_type};

/// [`PageFetcher`] backed by a shared `reqwest` client.
///
/// The client carries the configured user agent and per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with a client configured from `config`.
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_html_content_type(content_type.as_deref()) {
            return Err(AppError::fetch(
                url,
                format!(
                    "unexpected content type {}",
                    content_type.unwrap_or_default()
                ),
            ));
        }

        Ok(response.text().await?)
    }

    async fn fetch_robots(&self, seed: &Url) -> Option<String> {
        let robots_url = seed.join("/robots.txt").ok()?;

        let response = match self.client.get(robots_url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("robots.txt fetch failed for {}: {}", robots_url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            log::debug!("robots.txt at {} returned {}", robots_url, response.status());
            return None;
        }

        response.text().await.ok()
    }
}
