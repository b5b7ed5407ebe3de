//! Result handler contract
//!
//! The handler is the extension point of a crawl: it receives every
//! successfully fetched entry of the feed, once, after all entry fetches
//! have settled, and answers with further fetches and/or items. The
//! orchestrator forwards whatever it returns to the engine unchanged.

use crate::crawler::barrier::FetchedEntry;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::request::{Action, FetchFailure, FetchResponse};

/// Processes the entries of a feed
pub trait EntryHandler: Send {
    /// Item type emitted to the engine's sink
    type Item: Send;

    /// Class name used in the crawl's display name (`<NAME>@<domain>`)
    const NAME: &'static str = "RssCrawl";

    /// Called exactly once per crawl with the retained entries, in the order
    /// their fetches completed
    ///
    /// `extractor` has already been fed every one of these entries.
    fn handle_entries(
        &mut self,
        entries: Vec<FetchedEntry>,
        extractor: &dyn ContentExtractor,
    ) -> Vec<Action<Self::Item>>;

    /// Called for responses to follow-up requests this handler issued
    fn handle_response(&mut self, response: FetchResponse) -> Vec<Action<Self::Item>> {
        tracing::debug!("Ignoring follow-up response for {}", response.request.url);
        Vec::new()
    }

    /// Called for failures of follow-up requests this handler issued
    fn handle_failure(&mut self, failure: FetchFailure) -> Vec<Action<Self::Item>> {
        tracing::warn!(
            "Follow-up request {} failed: {}",
            failure.request.url,
            failure.error
        );
        Vec::new()
    }
}

/// Handler that yields nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl EntryHandler for NoopHandler {
    type Item = ();

    fn handle_entries(
        &mut self,
        _entries: Vec<FetchedEntry>,
        _extractor: &dyn ContentExtractor,
    ) -> Vec<Action<()>> {
        Vec::new()
    }
}
