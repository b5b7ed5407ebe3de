//! Per-crawl logging handle
//!
//! Every event is tagged with the crawl's display name (`RssCrawl@domain`) in
//! a `crawl` field; the subscriber decides how that is rendered.

use std::fmt;
use std::sync::Arc;

/// Identity of one crawl: the handler's class name and the allowed domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlIdentity {
    class_name: String,
    domain: String,
}

impl CrawlIdentity {
    pub fn new(class_name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            domain: domain.into(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns `<ClassName>@<domain>`
    pub fn display_name(&self) -> String {
        format!("{}@{}", self.class_name, self.domain)
    }
}

impl fmt::Display for CrawlIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.class_name, self.domain)
    }
}

/// Logging handle owned by one crawl
///
/// Cheap to clone; content extractors receive a clone so their messages
/// carry the same crawl name.
#[derive(Debug, Clone)]
pub struct CrawlLogger {
    name: Arc<str>,
}

impl CrawlLogger {
    pub fn new(identity: &CrawlIdentity) -> Self {
        Self {
            name: Arc::from(identity.display_name()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trace(&self, message: &str) {
        tracing::trace!(crawl = %self.name, "{}", message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(crawl = %self.name, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(crawl = %self.name, "{}", message);
    }

    pub fn warning(&self, message: &str) {
        tracing::warn!(crawl = %self.name, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(crawl = %self.name, "{}", message);
    }

    /// `tracing` has no level above error; critical events are errors
    /// flagged with `critical = true`.
    pub fn critical(&self, message: &str) {
        tracing::error!(crawl = %self.name, critical = true, "{}", message);
    }
}
