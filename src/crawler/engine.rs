//! Fetch engine
//!
//! The engine owns all concurrency. It executes the fetch requests a
//! [`Spider`] issues, bounded by a semaphore, and routes each completion back
//! to the spider one at a time. Emitted items go to an [`ItemSink`].
//!
//! Requests that do not opt out of filtering are dropped when they leave the
//! spider's allowed domain or repeat a URL already requested.

use crate::config::FetchConfig;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::request::{Action, FetchError, FetchFailure, FetchRequest, FetchResponse};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use url::Url;

/// Callback contract between the engine and a crawl
///
/// The engine never calls two of these methods concurrently.
pub trait Spider {
    /// Item type emitted to the sink
    type Item;

    fn name(&self) -> &str;

    /// Whether a filterable request may leave for `url`
    fn allows(&self, _url: &Url) -> bool {
        true
    }

    fn start_requests(&mut self) -> Vec<Action<Self::Item>>;

    fn on_response(&mut self, response: FetchResponse) -> Vec<Action<Self::Item>>;

    fn on_failure(&mut self, failure: FetchFailure) -> Vec<Action<Self::Item>>;
}

/// Destination for emitted items
pub trait ItemSink<T> {
    fn accept(&mut self, item: T);
}

impl<T> ItemSink<T> for Vec<T> {
    fn accept(&mut self, item: T) {
        self.push(item);
    }
}

/// Counters for one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub requests_issued: usize,
    pub requests_filtered: usize,
    pub responses: usize,
    pub failures: usize,
    pub items: usize,
}

type Completion = Result<FetchedPage, FetchError>;

/// In-flight state of one run
struct RunState {
    in_flight: JoinSet<Completion>,
    /// The request behind every task still in `in_flight`
    pending: HashMap<Id, FetchRequest>,
    seen: HashSet<Url>,
    stats: EngineStats,
}

/// Executes spider requests with bounded concurrency
pub struct Engine<F> {
    fetcher: Arc<F>,
    semaphore: Arc<Semaphore>,
}

impl<F: Fetcher + 'static> Engine<F> {
    /// Creates an engine
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Performs the individual fetches
    /// * `max_concurrent` - Upper bound on fetches in flight (at least 1)
    pub fn new(fetcher: F, max_concurrent: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Creates an engine sized by the `[fetch]` configuration
    pub fn from_config(fetcher: F, config: &FetchConfig) -> Self {
        Self::new(fetcher, config.max_concurrent_fetches as usize)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs a spider until no requests remain in flight
    ///
    /// # Returns
    ///
    /// Counters describing the run
    pub async fn run<S, K>(&self, spider: &mut S, sink: &mut K) -> EngineStats
    where
        S: Spider,
        K: ItemSink<S::Item>,
    {
        let mut state = RunState {
            in_flight: JoinSet::new(),
            pending: HashMap::new(),
            seen: HashSet::new(),
            stats: EngineStats::default(),
        };

        tracing::debug!("Engine starting {}", spider.name());
        let actions = spider.start_requests();
        self.dispatch(actions, spider, sink, &mut state);

        while let Some(joined) = state.in_flight.join_next_with_id().await {
            // A task that panicked or was cancelled still completes its
            // request, as a failure.
            let (id, result) = match joined {
                Ok((id, completion)) => (id, completion),
                Err(e) => {
                    tracing::error!("Fetch task for {} aborted: {}", spider.name(), e);
                    (e.id(), Err(FetchError::Other(e.to_string())))
                }
            };

            let Some(request) = state.pending.remove(&id) else {
                tracing::error!("Completion for unknown fetch task {}", id);
                continue;
            };

            let actions = match result {
                Ok(page) => {
                    state.stats.responses += 1;
                    tracing::debug!("Fetched {} ({})", page.final_url, page.status);
                    spider.on_response(FetchResponse {
                        request,
                        final_url: page.final_url,
                        status: page.status,
                        body: page.body,
                    })
                }
                Err(error) => {
                    state.stats.failures += 1;
                    tracing::debug!("Fetch of {} failed: {}", request.url, error);
                    spider.on_failure(FetchFailure { request, error })
                }
            };

            self.dispatch(actions, spider, sink, &mut state);
        }

        tracing::debug!(
            "Engine finished {}: {} issued, {} filtered",
            spider.name(),
            state.stats.requests_issued,
            state.stats.requests_filtered
        );
        state.stats
    }

    fn dispatch<S, K>(
        &self,
        actions: Vec<Action<S::Item>>,
        spider: &S,
        sink: &mut K,
        state: &mut RunState,
    ) where
        S: Spider,
        K: ItemSink<S::Item>,
    {
        for action in actions {
            match action {
                Action::Fetch(request) => {
                    if !request.allow_duplicates {
                        if !spider.allows(&request.url) {
                            tracing::debug!("Filtered offsite request to {}", request.url);
                            state.stats.requests_filtered += 1;
                            continue;
                        }
                        if !state.seen.insert(request.url.clone()) {
                            tracing::debug!("Filtered duplicate request to {}", request.url);
                            state.stats.requests_filtered += 1;
                            continue;
                        }
                    }

                    state.stats.requests_issued += 1;
                    self.spawn_fetch(request, state);
                }
                Action::Emit(item) => {
                    state.stats.items += 1;
                    sink.accept(item);
                }
            }
        }
    }

    fn spawn_fetch(&self, request: FetchRequest, state: &mut RunState) {
        let fetcher = Arc::clone(&self.fetcher);
        let semaphore = Arc::clone(&self.semaphore);
        let url = request.url.clone();

        let handle = state.in_flight.spawn(async move {
            // The semaphore is never closed, so the permit is always granted.
            let _permit = semaphore.acquire_owned().await;
            fetcher.fetch(&url).await
        });
        state.pending.insert(handle.id(), request);
    }
}
