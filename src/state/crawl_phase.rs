//! Phase definitions for one feed crawl
//!
//! A crawl moves strictly forward through these phases; it never resets.
use std::fmt;

/// Represents where a crawl currently is in its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Constructed, start requests not yet issued
    Created,

    /// Waiting for the start page
    FetchingStartPage,

    /// Trying feed candidates one at a time
    Discovering,

    /// Entry fetches are outstanding; the barrier has not fired
    Collecting,

    // ===== Terminal Phases =====
    /// The barrier fired and the handler ran
    Complete,

    /// The crawl gave up (start page failed or no candidate worked)
    Abandoned,
}

impl CrawlPhase {
    /// Returns true if no further completions are expected to change the crawl
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }

    /// Returns true if the crawl may still make progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the crawl completed normally
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns true if moving to `next` is a legal forward transition
    ///
    /// Any active phase may be abandoned; `Collecting` is reached only from
    /// `Discovering`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (Created, FetchingStartPage) => true,
            (FetchingStartPage, Discovering) => true,
            (Discovering, Collecting) => true,
            (Collecting, Complete) => true,
            (from, Abandoned) => from.is_active(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::FetchingStartPage => "fetching_start_page",
            Self::Discovering => "discovering",
            Self::Collecting => "collecting",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
