//! Pipeline entry points.
//!
//! - `run_crawler`: crawl a site from its seed URL
//! - `write_report`: print or save the sorted report

pub mod crawl;
pub mod report;

pub use crawl::{CrawlReport, parse_seed, run_crawler};
pub use report::{render_json, render_text, sort_pages, write_report};
