// src/pipeline/crawl.rs

//! Site crawling pipeline.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::crawl::{Orchestrator, RobotsPolicy};
use crate::error::{AppError, Result};
use crate::models::{Config, CrawlStats, PageReport};
use crate::pipeline::report::sort_pages;
use crate::services::{ContentAnalyzer, PageFetcher};
use crate::utils::url::host_of;

/// Result of a finished run, ready for [`write_report`](crate::pipeline::write_report).
#[derive(Debug)]
pub struct CrawlReport {
    pub seed: Url,
    /// Rows in report order
    pub pages: Vec<PageReport>,
    pub stats: CrawlStats,
}

/// Parse and check the seed URL.
pub fn parse_seed(raw: &str) -> Result<Url> {
    let seed = Url::parse(raw.trim())
        .map_err(|e| AppError::config(format!("invalid seed URL '{raw}': {e}")))?;
    if !matches!(seed.scheme(), "http" | "https") {
        return Err(AppError::config(format!(
            "seed URL must be http or https, got '{}'",
            seed.scheme()
        )));
    }
    if seed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::config(format!("seed URL '{raw}' has no host")));
    }
    Ok(seed)
}

/// Crawl the site behind `seed`.
///
/// Configuration problems are returned before any request is made. After
/// that the run always completes with whatever the ledger holds.
pub async fn run_crawler(
    config: &Config,
    seed: &str,
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
) -> Result<CrawlReport> {
    config.validate()?;
    let seed = parse_seed(seed)?;
    let seed_host = host_of(seed.as_str()).unwrap_or_default();

    let start_time = Utc::now();
    log::info!(
        "Crawling {} (max {} pages, {} concurrent)",
        seed,
        config.crawler.max_pages,
        config.crawler.max_concurrent
    );

    let robots_txt = fetcher.fetch_robots(&seed).await;
    let robots = RobotsPolicy::from_fetched(robots_txt.as_deref(), &config.crawler.user_agent);
    if !robots.is_empty() {
        log::info!("robots.txt disallows {} path prefixes", robots.disallowed().len());
    }

    let mut orchestrator = Orchestrator::new(&config.crawler, &seed_host, robots, fetcher);
    if let Some(analyzer) = analyzer {
        orchestrator = orchestrator.with_analyzer(analyzer);
    }

    let outcome = orchestrator.run(&seed).await;

    let stats = CrawlStats {
        start_time,
        end_time: Utc::now(),
        page_count: outcome.pages.len(),
        fetch_failures: outcome.fetch_failures,
        analysis_failures: outcome.analysis_failures,
        timed_out: outcome.timed_out,
    };

    log::info!(
        "Crawl complete: {} pages, {} fetched, {} failed in {:.1}s",
        stats.page_count,
        outcome.fetched,
        stats.fetch_failures,
        stats.elapsed_secs()
    );
    if stats.analysis_failures > 0 {
        log::warn!("{} pages have no suggestions", stats.analysis_failures);
    }

    Ok(CrawlReport {
        seed,
        pages: sort_pages(outcome.pages),
        stats,
    })
}
