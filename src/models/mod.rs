// src/models/mod.rs

//! Domain models for the crawler.

mod config;
mod page;

pub use config::{
    AnalyzerConfig, Config, CrawlerConfig, LoggingConfig, OutputConfig, Provider, ReportFormat,
};
pub use page::{PageMetadata, PageReport, Suggestions, VisitRecord};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary statistics of a crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Distinct pages in the ledger
    pub page_count: usize,
    /// Pages whose fetch or parse failed
    pub fetch_failures: usize,
    /// Pages whose suggestion request failed
    pub analysis_failures: usize,
    /// Whether the run deadline cut the crawl short
    pub timed_out: bool,
}

impl CrawlStats {
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
