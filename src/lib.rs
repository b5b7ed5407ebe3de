//! Bibcrawl: a feed-driven blog crawler
//!
//! This crate turns a single seed URL into the set of entry documents of one
//! RSS/Atom feed: it discovers the feed from the start page, fetches every
//! entry it lists concurrently, and hands the successfully fetched entries to
//! a pluggable handler once all of them have settled.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Bibcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No usable RSS feed: {tried} candidate(s) failed")]
    FeedDiscoveryExhausted { tried: usize },

    #[error("Start page {url} could not be fetched: {reason}")]
    StartPageFailed { url: String, reason: String },

    #[error("Crawl stopped while {phase}")]
    Unfinished { phase: String },

    #[error("Feed parse error for {url}: {message}")]
    FeedParse { url: String, message: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Bibcrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Action, Engine, EntryHandler, FetchedEntry, HttpFetcher, RssCrawl};
pub use state::CrawlPhase;
pub use crate::url::{derive_domain, extract_domain, SeedConfig};
