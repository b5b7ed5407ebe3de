//! One feed's discovery-to-collection cycle
//!
//! A session is created when a feed body parses, fixes the expected entry
//! URLs at that moment, and owns the entry barrier sized to them. A crawl
//! has at most one session and never replaces it.

use crate::crawler::barrier::{Arrival, EntryBarrier, EntryOutcome, FetchedEntry};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::request::{FetchRequest, Stage};
use std::fmt;
use url::Url;

pub struct FeedSession {
    feed_url: Url,
    expected_entry_urls: Vec<Url>,
    extractor: Box<dyn ContentExtractor>,
    barrier: EntryBarrier,
}

impl FeedSession {
    /// Binds a session to a parsed feed
    ///
    /// The extractor's entry links are read once here; later changes to what
    /// it reports do not move the barrier's target.
    pub fn new(feed_url: Url, extractor: Box<dyn ContentExtractor>) -> Self {
        let expected_entry_urls = extractor.entry_links().to_vec();
        let barrier = EntryBarrier::new(expected_entry_urls.len());

        Self {
            feed_url,
            expected_entry_urls,
            extractor,
            barrier,
        }
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    pub fn expected_entry_urls(&self) -> &[Url] {
        &self.expected_entry_urls
    }

    pub fn expected_count(&self) -> usize {
        self.barrier.expected()
    }

    pub fn barrier(&self) -> &EntryBarrier {
        &self.barrier
    }

    pub fn extractor(&self) -> &dyn ContentExtractor {
        self.extractor.as_ref()
    }

    /// One entry request per expected URL, in feed order
    pub fn entry_requests(&self) -> Vec<FetchRequest> {
        self.expected_entry_urls
            .iter()
            .map(|url| FetchRequest::new(url.clone(), Stage::Entry))
            .collect()
    }

    /// Buffers one entry outcome
    pub fn record(&self, outcome: EntryOutcome) -> Arrival {
        self.barrier.arrive(outcome)
    }

    /// Releases the barrier of a session that expects no entries
    pub fn release_if_empty(&self) -> Option<Vec<EntryOutcome>> {
        if self.expected_entry_urls.is_empty() {
            self.barrier.try_release()
        } else {
            None
        }
    }

    /// Feeds retained entries to the extractor, in the given order
    pub fn feed_extractor(&mut self, entries: &[FetchedEntry]) {
        for entry in entries {
            self.extractor.feed(&entry.body, &entry.source_url);
        }
    }
}

impl fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSession")
            .field("feed_url", &self.feed_url.as_str())
            .field("expected", &self.expected_entry_urls.len())
            .field("buffered", &self.barrier.buffered())
            .field("released", &self.barrier.is_released())
            .finish()
    }
}
