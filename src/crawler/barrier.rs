//! Fan-in barrier over entry fetches
//!
//! The barrier buffers one outcome per completed entry fetch, success or
//! failure, and releases the whole buffer exactly once: the moment the
//! number of buffered outcomes reaches the expected count. The append, the
//! count and the comparison happen under one lock, so concurrent completions
//! can neither skip nor repeat the release.

use crate::crawler::request::FetchError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// An entry that was fetched successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEntry {
    /// The URL the entry fetch was issued for
    pub source_url: Url,
    /// The URL the transport reported; may differ from `source_url`
    pub final_url: Url,
    pub body: String,
}

/// How one entry fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Fetched(FetchedEntry),
    Failed { source_url: Url, error: FetchError },
}

impl EntryOutcome {
    pub fn source_url(&self) -> &Url {
        match self {
            Self::Fetched(entry) => &entry.source_url,
            Self::Failed { source_url, .. } => source_url,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }

    /// Returns the fetched entry, or None for a failure
    pub fn into_fetched(self) -> Option<FetchedEntry> {
        match self {
            Self::Fetched(entry) => Some(entry),
            Self::Failed { .. } => None,
        }
    }
}

/// Result of delivering one outcome to the barrier
#[derive(Debug, PartialEq, Eq)]
pub enum Arrival {
    /// Buffered; more outcomes are still expected
    Waiting { buffered: usize, expected: usize },
    /// This outcome completed the set; every buffered outcome, in arrival order
    Released(Vec<EntryOutcome>),
    /// The barrier had already released; the outcome was not buffered
    Late,
}

#[derive(Debug)]
struct BarrierState {
    /// Outcomes waiting for release; emptied when the barrier fires
    buffered: Vec<EntryOutcome>,
    /// Outcomes accepted so far, including ones already handed out
    settled: usize,
    released: bool,
}

/// Buffers entry outcomes until all expected ones have arrived
#[derive(Debug)]
pub struct EntryBarrier {
    expected: usize,
    state: Mutex<BarrierState>,
}

impl EntryBarrier {
    /// Creates a barrier waiting for `expected` outcomes
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(BarrierState {
                buffered: Vec::with_capacity(expected),
                settled: 0,
                released: false,
            }),
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of outcomes accepted so far, released or not
    pub fn buffered(&self) -> usize {
        self.lock().settled
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Buffers an outcome and releases the barrier if it was the last one
    pub fn arrive(&self, outcome: EntryOutcome) -> Arrival {
        let mut state = self.lock();

        if state.released {
            return Arrival::Late;
        }

        state.buffered.push(outcome);
        state.settled += 1;
        match Self::release_if_complete(&mut state, self.expected) {
            Some(released) => released,
            None => Arrival::Waiting {
                buffered: state.settled,
                expected: self.expected,
            },
        }
    }

    /// Releases the barrier if nothing more is expected
    ///
    /// Used for feeds with no entries, where no arrival will ever trigger
    /// the release. Returns None if outcomes are still missing or the
    /// barrier already released.
    pub fn try_release(&self) -> Option<Vec<EntryOutcome>> {
        let mut state = self.lock();
        if state.released {
            return None;
        }

        match Self::release_if_complete(&mut state, self.expected) {
            Some(Arrival::Released(outcomes)) => Some(outcomes),
            _ => None,
        }
    }

    fn release_if_complete(state: &mut BarrierState, expected: usize) -> Option<Arrival> {
        if state.settled != expected {
            return None;
        }

        // The outcomes move out; the barrier keeps only the count.
        state.released = true;
        Some(Arrival::Released(std::mem::take(&mut state.buffered)))
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        // Nothing panics while the buffer is half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps only successful outcomes, preserving arrival order
pub fn retained_entries(outcomes: Vec<EntryOutcome>) -> Vec<FetchedEntry> {
    outcomes
        .into_iter()
        .filter_map(EntryOutcome::into_fetched)
        .collect()
}
