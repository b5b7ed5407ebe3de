//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Tracks where a crawl is in its discovery-to-collection cycle

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
