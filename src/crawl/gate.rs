// src/crawl/gate.rs

//! Admission control for crawl candidates.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::crawl::{Registration, RobotsPolicy, VisitLedger};
use crate::utils::url::normalize_url;

/// Why a candidate was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The ledger already holds `max_pages` records
    OverBudget,
    /// The candidate is not a parseable absolute URL
    InvalidUrl,
    /// The candidate lives on another host
    CrossHost,
    /// robots.txt disallows the path
    Disallowed,
    /// The normalized URL is already in the ledger
    AlreadySeen,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::OverBudget => "page budget reached",
            RejectReason::InvalidUrl => "invalid URL",
            RejectReason::CrossHost => "other host",
            RejectReason::Disallowed => "disallowed by robots.txt",
            RejectReason::AlreadySeen => "already seen",
        };
        f.write_str(reason)
    }
}

/// Outcome of [`CrawlGate::admit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the record now exists under `normalized`
    Proceed { normalized: String },
    Reject(RejectReason),
}

impl Admission {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Admission::Proceed { .. })
    }
}

/// Decides whether a candidate URL is fetched.
///
/// Checks run in a fixed order: budget, host, robots, normalization, then
/// first sighting. Only the last step touches the ledger, so a rejected
/// candidate never leaves a record behind. The budget is checked again,
/// atomically, when the record is created, so the ledger never holds more
/// than `max_pages` entries. A candidate turned away for budget is not
/// retried later in the run.
#[derive(Debug, Clone)]
pub struct CrawlGate {
    ledger: Arc<VisitLedger>,
    robots: Arc<RobotsPolicy>,
    seed_host: String,
    max_pages: usize,
}

impl CrawlGate {
    pub fn new(
        ledger: Arc<VisitLedger>,
        robots: Arc<RobotsPolicy>,
        seed_host: impl Into<String>,
        max_pages: usize,
    ) -> Self {
        Self {
            ledger,
            robots,
            seed_host: seed_host.into().to_lowercase(),
            max_pages,
        }
    }

    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    /// Whether the page budget has been used up.
    pub fn budget_exhausted(&self) -> bool {
        self.ledger.record_count() >= self.max_pages
    }

    /// Evaluate a candidate, registering it on first sighting.
    pub fn admit(&self, candidate: &str) -> Admission {
        if self.budget_exhausted() {
            return Admission::Reject(RejectReason::OverBudget);
        }

        let Ok(parsed) = Url::parse(candidate) else {
            return Admission::Reject(RejectReason::InvalidUrl);
        };
        match parsed.host_str() {
            Some(host) if host.eq_ignore_ascii_case(&self.seed_host) => {}
            Some(_) => return Admission::Reject(RejectReason::CrossHost),
            None => return Admission::Reject(RejectReason::InvalidUrl),
        }

        if !self.robots.is_allowed(candidate) {
            return Admission::Reject(RejectReason::Disallowed);
        }

        let Ok(normalized) = normalize_url(candidate) else {
            return Admission::Reject(RejectReason::InvalidUrl);
        };

        match self.ledger.register_visit_within(&normalized, self.max_pages) {
            Registration::First => Admission::Proceed { normalized },
            Registration::Repeat => Admission::Reject(RejectReason::AlreadySeen),
            Registration::Full => Admission::Reject(RejectReason::OverBudget),
        }
    }
}
