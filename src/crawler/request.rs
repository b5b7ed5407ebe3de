//! Fetch requests, completions and actions
//!
//! These are the values exchanged between a spider and the fetch engine. A
//! request names the stage that should receive its completion, and the
//! engine hands the original request back with every response or failure.

use std::fmt;
use thiserror::Error;
use url::Url;

/// Which handler a completion is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The seed page feed candidates are read from
    StartPage,
    /// One feed candidate
    FeedCandidate,
    /// One entry listed by the feed
    Entry,
    /// A request issued by the result handler
    Followup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartPage => "start_page",
            Self::FeedCandidate => "feed_candidate",
            Self::Entry => "entry",
            Self::Followup => "followup",
        };
        write!(f, "{}", name)
    }
}

/// Metadata carried by a request and returned untouched with its completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// The URL the request was issued for
    ///
    /// This is the trusted copy; the URL a transport reports after redirects
    /// may differ.
    pub source_url: Url,
}

/// A request for the fetch engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    pub stage: Stage,
    pub meta: RequestMeta,
    /// Bypass duplicate and offsite filtering in the engine
    pub allow_duplicates: bool,
}

impl FetchRequest {
    /// Creates a request whose metadata records `url` as its source
    ///
    /// Requests built here always bypass engine filtering, since feed
    /// candidates and entries legitimately repeat URLs.
    pub fn new(url: Url, stage: Stage) -> Self {
        Self {
            meta: RequestMeta {
                source_url: url.clone(),
            },
            url,
            stage,
            allow_duplicates: true,
        }
    }

    /// Creates a handler follow-up request subject to engine filtering
    pub fn followup(url: Url) -> Self {
        Self {
            allow_duplicates: false,
            ..Self::new(url, Stage::Followup)
        }
    }

    pub fn source_url(&self) -> &Url {
        &self.meta.source_url
    }
}

/// A successful completion
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The request this answers
    pub request: FetchRequest,
    /// The URL the transport reports having reached
    pub final_url: Url,
    pub status: u16,
    pub body: String,
}

/// A failed completion
#[derive(Debug)]
pub struct FetchFailure {
    /// The request that failed
    pub request: FetchRequest,
    pub error: FetchError,
}

/// Reasons a fetch can fail
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Too many redirects")]
    RedirectLimit,

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

/// What a spider asks the engine to do next
#[derive(Debug)]
pub enum Action<T> {
    /// Issue another fetch
    Fetch(FetchRequest),
    /// Hand an item to the engine's sink
    Emit(T),
}

impl<T> Action<T> {
    /// Returns the request if this action is a fetch
    pub fn as_fetch(&self) -> Option<&FetchRequest> {
        match self {
            Self::Fetch(request) => Some(request),
            Self::Emit(_) => None,
        }
    }
}
