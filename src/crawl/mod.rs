//! Crawl engine.
//!
//! - `VisitLedger`: shared map of normalized URL to visit record
//! - `ConcurrencyLimiter`: bounds in-flight fetches
//! - `RobotsPolicy`: disallow rules parsed from robots.txt
//! - `CrawlGate`: budget, host, robots and dedup checks per candidate
//! - `Orchestrator`: spawns one task per candidate and waits for all of them

mod gate;
mod ledger;
mod limiter;
mod orchestrator;
mod robots;

pub use gate::{Admission, CrawlGate, RejectReason};
pub use ledger::{Registration, VisitLedger};
pub use limiter::{ConcurrencyLimiter, FetchSlot};
pub use orchestrator::{CrawlOutcome, Orchestrator};
pub use robots::RobotsPolicy;
