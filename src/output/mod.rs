//! Output module for crawl summaries
//!
//! This module handles:
//! - Summarising a crawl into a [`CrawlReport`]
//! - Formatting and printing reports

mod report;

pub use report::{format_report, print_report, CrawlReport};
