//! Crawl report
//!
//! A snapshot of where one crawl stands, built by the orchestrator and
//! printed by the binary once the engine finishes.

use crate::crawler::EngineStats;
use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};

/// Summary of one crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// Display name, `<ClassName>@<domain>`
    pub name: String,

    pub phase: CrawlPhase,

    pub start_url: String,

    pub allowed_domain: String,

    /// The feed the session was bound to, if discovery succeeded
    pub feed_url: Option<String>,

    /// Number of candidate feed URLs requested
    pub candidates_tried: usize,

    pub entries_expected: usize,

    pub entries_fetched: usize,

    pub entries_failed: usize,

    /// Entry pages fed to the content extractor
    pub pages_extracted: usize,

    /// Terminal error message of an abandoned crawl
    pub error: Option<String>,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlReport {
    /// Wall-clock duration, once the crawl has finished
    pub fn duration_seconds(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => {
                Some((finished - started).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        }
    }

    /// Percentage of expected entries that were fetched
    pub fn success_rate(&self) -> f64 {
        if self.entries_expected == 0 {
            0.0
        } else {
            (self.entries_fetched as f64 / self.entries_expected as f64) * 100.0
        }
    }
}

/// Formats a report (and optionally the engine counters) as plain text
pub fn format_report(report: &CrawlReport, engine: Option<&EngineStats>) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Report ===\n\n");

    out.push_str(&format!("Crawl: {}\n", report.name));
    out.push_str(&format!("  Phase: {}\n", report.phase));
    out.push_str(&format!("  Start URL: {}\n", report.start_url));
    out.push_str(&format!("  Allowed domain: {}\n", report.allowed_domain));
    if let Some(duration) = report.duration_seconds() {
        out.push_str(&format!("  Duration: {:.2}s\n", duration));
    }
    out.push('\n');

    out.push_str("Discovery:\n");
    out.push_str(&format!("  Candidates tried: {}\n", report.candidates_tried));
    match &report.feed_url {
        Some(feed) => out.push_str(&format!("  Feed: {}\n", feed)),
        None => out.push_str("  Feed: none\n"),
    }
    out.push('\n');

    if report.feed_url.is_some() {
        out.push_str("Entries:\n");
        out.push_str(&format!("  Expected: {}\n", report.entries_expected));
        out.push_str(&format!(
            "  Fetched: {} ({:.1}%)\n",
            report.entries_fetched,
            report.success_rate()
        ));
        out.push_str(&format!("  Failed: {}\n", report.entries_failed));
        out.push_str(&format!("  Pages extracted: {}\n", report.pages_extracted));
        out.push('\n');
    }

    if let Some(stats) = engine {
        out.push_str("Engine:\n");
        out.push_str(&format!("  Requests issued: {}\n", stats.requests_issued));
        out.push_str(&format!("  Requests filtered: {}\n", stats.requests_filtered));
        out.push_str(&format!("  Responses: {}\n", stats.responses));
        out.push_str(&format!("  Failures: {}\n", stats.failures));
        out.push_str(&format!("  Items: {}\n", stats.items));
        out.push('\n');
    }

    if let Some(error) = &report.error {
        out.push_str(&format!("Error: {}\n", error));
    }

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport, engine: Option<&EngineStats>) {
    print!("{}", format_report(report, engine));
}
