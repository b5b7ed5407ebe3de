//! Crawler module for feed discovery and entry collection
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeouts
//! - Feed discovery and feed/HTML link extraction
//! - The entry barrier and the per-feed session
//! - The fetch engine and the crawl orchestrator

mod barrier;
mod engine;
mod extractor;
mod fetcher;
mod handler;
mod logger;
mod orchestrator;
mod parser;
mod request;
mod session;

pub use barrier::{retained_entries, Arrival, EntryBarrier, EntryOutcome, FetchedEntry};
pub use engine::{Engine, EngineStats, ItemSink, Spider};
pub use extractor::{
    ContentExtractor, ExtractedPage, ExtractorFactory, FeedContentExtractor, FeedExtractorFactory,
};
pub use fetcher::{build_http_client, fetch_url, FetchedPage, Fetcher, HttpFetcher};
pub use handler::{EntryHandler, NoopHandler};
pub use logger::{CrawlIdentity, CrawlLogger};
pub use orchestrator::RssCrawl;
pub use parser::{
    extract_entry_links, feed_candidates, page_title, CandidateStream, DefaultLinkExtractor,
    LinkExtractor,
};
pub use request::{
    Action, FetchError, FetchFailure, FetchRequest, FetchResponse, RequestMeta, Stage,
};
pub use session::FeedSession;

use crate::config::Config;
use crate::CrawlError;

/// Everything a finished crawl leaves behind
pub struct CrawlRun<H: EntryHandler> {
    pub crawl: RssCrawl<H>,
    pub items: Vec<H::Item>,
    pub stats: EngineStats,
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Derive the seed and allowed domain
/// 2. Build the HTTP client
/// 3. Fetch the start page and discover the feed
/// 4. Fetch every entry of the feed
/// 5. Hand the fetched entries to `handler`
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `handler` - Receives the fetched entries
///
/// # Returns
///
/// * `Ok(CrawlRun)` - The crawl ran to a terminal phase (which may be abandoned)
/// * `Err(CrawlError)` - The crawl could not be set up
pub async fn run_crawl<H: EntryHandler>(
    config: &Config,
    handler: H,
) -> Result<CrawlRun<H>, CrawlError> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)?;
    let engine = Engine::from_config(fetcher, &config.fetch);
    let mut crawl = RssCrawl::from_config(config, handler)?;
    let mut items = Vec::new();

    let stats = engine.run(&mut crawl, &mut items).await;

    Ok(CrawlRun {
        crawl,
        items,
        stats,
    })
}
