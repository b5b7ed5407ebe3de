//! Content extraction over a feed and its fetched entries
//!
//! A content extractor is bound to one feed body. It reports the feed's
//! entry links (fixed at construction) and is fed each retained entry once
//! the entry barrier releases.

use crate::crawler::logger::CrawlLogger;
use crate::crawler::parser::{page_title, LinkExtractor};
use crate::CrawlError;
use std::sync::Arc;
use url::Url;

/// Aggregates content from the entries of one feed
pub trait ContentExtractor: Send {
    /// The entry links of the feed, in feed order
    ///
    /// Must return the same sequence for the whole life of the extractor.
    fn entry_links(&self) -> &[Url];

    /// Consumes one fetched entry
    fn feed(&mut self, body: &str, source_url: &Url);

    /// Pages extracted so far
    fn pages(&self) -> &[ExtractedPage] {
        &[]
    }
}

/// Builds a content extractor for a freshly fetched feed
pub trait ExtractorFactory: Send + Sync {
    /// # Errors
    ///
    /// Fails if the feed body cannot be parsed as a feed.
    fn build(
        &self,
        feed_body: &str,
        feed_url: &Url,
        logger: CrawlLogger,
    ) -> Result<Box<dyn ContentExtractor>, CrawlError>;
}

/// What was extracted from one entry page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub url: Url,
    pub title: Option<String>,
    pub bytes: usize,
}

/// Default extractor: records the title of every entry page it is fed
#[derive(Debug)]
pub struct FeedContentExtractor {
    entry_links: Vec<Url>,
    pages: Vec<ExtractedPage>,
    logger: CrawlLogger,
}

impl FeedContentExtractor {
    /// Parses the feed's entry links with the given link extractor
    pub fn new(
        feed_body: &str,
        feed_url: &Url,
        links: &dyn LinkExtractor,
        logger: CrawlLogger,
    ) -> Result<Self, CrawlError> {
        let entry_links = links.entry_links(feed_body, feed_url)?;
        logger.debug(&format!(
            "Feed {} lists {} entries",
            feed_url,
            entry_links.len()
        ));

        Ok(Self {
            entry_links,
            pages: Vec::new(),
            logger,
        })
    }
}

impl ContentExtractor for FeedContentExtractor {
    fn entry_links(&self) -> &[Url] {
        &self.entry_links
    }

    fn feed(&mut self, body: &str, source_url: &Url) {
        let title = page_title(body);
        self.logger.info(&format!(
            "Entry: {} ({})",
            source_url,
            title.as_deref().unwrap_or("untitled")
        ));

        self.pages.push(ExtractedPage {
            url: source_url.clone(),
            title,
            bytes: body.len(),
        });
    }

    fn pages(&self) -> &[ExtractedPage] {
        &self.pages
    }
}

/// Factory for [`FeedContentExtractor`]
#[derive(Clone)]
pub struct FeedExtractorFactory {
    links: Arc<dyn LinkExtractor>,
}

impl FeedExtractorFactory {
    pub fn new(links: Arc<dyn LinkExtractor>) -> Self {
        Self { links }
    }
}

impl ExtractorFactory for FeedExtractorFactory {
    fn build(
        &self,
        feed_body: &str,
        feed_url: &Url,
        logger: CrawlLogger,
    ) -> Result<Box<dyn ContentExtractor>, CrawlError> {
        let extractor = FeedContentExtractor::new(feed_body, feed_url, self.links.as_ref(), logger)?;
        Ok(Box::new(extractor))
    }
}
