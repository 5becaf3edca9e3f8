// src/crawl/orchestrator.rs

//! Fan-out crawl engine.
//!
//! Every candidate URL becomes its own task in a [`JoinSet`]. A task runs the
//! candidate through the [`CrawlGate`], waits for a fetch slot, fetches and
//! parses the page, then hands the outbound links back to the driver loop,
//! which spawns one new task per link. The run ends when the set drains.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::task::JoinSet;
use url::Url;

use crate::crawl::{Admission, ConcurrencyLimiter, CrawlGate, RobotsPolicy, VisitLedger};
use crate::models::{CrawlerConfig, VisitRecord};
use crate::services::{ContentAnalyzer, PageFetcher, extract_links, extract_metadata};

/// Summary of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Final ledger contents keyed by normalized URL
    pub pages: HashMap<String, VisitRecord>,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub analysis_failures: usize,
    /// The run deadline elapsed before every task finished
    pub timed_out: bool,
}

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    analysis_failures: AtomicUsize,
}

/// State shared by every task of one run.
struct Shared {
    gate: CrawlGate,
    ledger: Arc<VisitLedger>,
    limiter: ConcurrencyLimiter,
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
    delay: Duration,
    counters: Counters,
}

/// Crawls a single site starting from a seed URL.
pub struct Orchestrator {
    gate: CrawlGate,
    ledger: Arc<VisitLedger>,
    limiter: ConcurrencyLimiter,
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
    delay: Duration,
    run_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Build an engine for the site `seed_host`.
    ///
    /// Budget, concurrency, delay and run deadline come from `config`.
    pub fn new(
        config: &CrawlerConfig,
        seed_host: &str,
        robots: RobotsPolicy,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let ledger = Arc::new(VisitLedger::new());
        let gate = CrawlGate::new(
            Arc::clone(&ledger),
            Arc::new(robots),
            seed_host,
            config.max_pages,
        );

        Self {
            gate,
            ledger,
            limiter: ConcurrencyLimiter::new(config.max_concurrent),
            fetcher,
            analyzer: None,
            delay: config.request_delay(),
            run_timeout: config.run_timeout(),
        }
    }

    /// Request content suggestions for every fetched page.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn ledger(&self) -> &Arc<VisitLedger> {
        &self.ledger
    }

    /// Crawl from `seed` until no task remains or the run deadline passes.
    ///
    /// Per-page failures are logged and counted; they never end the run.
    pub async fn run(&self, seed: &Url) -> CrawlOutcome {
        let shared = Arc::new(Shared {
            gate: self.gate.clone(),
            ledger: Arc::clone(&self.ledger),
            limiter: self.limiter.clone(),
            fetcher: Arc::clone(&self.fetcher),
            analyzer: self.analyzer.clone(),
            delay: self.delay,
            counters: Counters::default(),
        });

        let mut tasks = JoinSet::new();
        tasks.spawn(visit(Arc::clone(&shared), seed.to_string()));

        let drained = match self.run_timeout {
            Some(limit) => tokio::time::timeout(limit, drain(&shared, &mut tasks))
                .await
                .is_ok(),
            None => {
                drain(&shared, &mut tasks).await;
                true
            }
        };

        if !drained {
            log::warn!(
                "Run deadline reached, aborting {} outstanding tasks",
                tasks.len()
            );
            shared.limiter.close();
            tasks.shutdown().await;
        }

        let counters = &shared.counters;
        CrawlOutcome {
            pages: shared.ledger.snapshot(),
            fetched: counters.fetched.load(Ordering::Relaxed),
            fetch_failures: counters.fetch_failures.load(Ordering::Relaxed),
            analysis_failures: counters.analysis_failures.load(Ordering::Relaxed),
            timed_out: !drained,
        }
    }
}

/// Join finished tasks and spawn one new task per returned link.
async fn drain(shared: &Arc<Shared>, tasks: &mut JoinSet<Vec<String>>) {
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(links) => {
                for link in links {
                    tasks.spawn(visit(Arc::clone(shared), link));
                }
            }
            Err(e) if e.is_panic() => {
                log::error!("Crawl task panicked: {}", e);
                shared
                    .counters
                    .fetch_failures
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {}
        }
    }
}

/// Process one candidate and return the links found on its page.
async fn visit(shared: Arc<Shared>, candidate: String) -> Vec<String> {
    let normalized = match shared.gate.admit(&candidate) {
        Admission::Proceed { normalized } => normalized,
        Admission::Reject(reason) => {
            log::debug!("Skipping {}: {}", candidate, reason);
            return Vec::new();
        }
    };

    let Some(_slot) = shared.limiter.acquire().await else {
        return Vec::new();
    };

    log::info!("Crawling {}", candidate);
    if !shared.delay.is_zero() {
        tokio::time::sleep(shared.delay).await;
    }

    let body = match shared.fetcher.fetch_page(&candidate).await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Fetch failed for {}: {}", candidate, e);
            shared.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
            return Vec::new();
        }
    };
    shared.counters.fetched.fetch_add(1, Ordering::Relaxed);

    let metadata = match extract_metadata(&body) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::warn!("Could not read attributes of {}: {}", candidate, e);
            shared.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
            return Vec::new();
        }
    };

    let (title, description) = (metadata.title.clone(), metadata.description.clone());
    shared.ledger.attach_metadata(&normalized, metadata);

    if let Some(analyzer) = &shared.analyzer {
        match analyzer.analyze(&candidate, &title, &description).await {
            Ok(suggestions) => shared.ledger.attach_suggestions(&normalized, suggestions),
            Err(e) => {
                log::warn!("Analysis failed for {}: {}", candidate, e);
                shared
                    .counters
                    .analysis_failures
                    .fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    let base = match Url::parse(&candidate) {
        Ok(base) => base,
        Err(e) => {
            log::warn!("Bad base URL {}: {}", candidate, e);
            return Vec::new();
        }
    };
    match extract_links(&body, &base) {
        Ok(links) => {
            log::debug!("Found {} links on {}", links.len(), candidate);
            links
        }
        Err(e) => {
            log::warn!("Link extraction failed for {}: {}", candidate, e);
            Vec::new()
        }
    }
}
