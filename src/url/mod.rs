//! URL handling module for Bibcrawl
//!
//! This module provides domain extraction, allowed-domain derivation and
//! matching, and the immutable seed of a crawl.

mod domain;
mod matcher;

use crate::UrlResult;
use url::Url;

pub use domain::{derive_domain, extract_domain, parse_http_url};
pub use matcher::matches_domain;

/// The seed of one crawl: where it starts and which domain it belongs to
///
/// Set once at construction and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    start_url: Url,
    allowed_domain: String,
}

impl SeedConfig {
    /// Creates a seed, deriving the allowed domain from the start URL when
    /// none is given
    ///
    /// # Examples
    ///
    /// ```
    /// use bibcrawl::url::SeedConfig;
    ///
    /// let seed = SeedConfig::new("http://blog.example.com/index.html", None).unwrap();
    /// assert_eq!(seed.allowed_domain(), "blog.example.com");
    /// ```
    pub fn new(start_url: &str, domain: Option<&str>) -> UrlResult<Self> {
        let start_url = parse_http_url(start_url)?;
        let allowed_domain = match domain {
            Some(domain) => domain.trim().to_lowercase(),
            None => extract_domain(&start_url).ok_or(crate::UrlError::MissingDomain)?,
        };

        Ok(Self {
            start_url,
            allowed_domain,
        })
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    /// Returns true if the URL's host is inside the allowed domain
    pub fn allows(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| matches_domain(&self.allowed_domain, host))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_derives_domain() {
        let seed = SeedConfig::new("http://blog.example.com/index.html", None).unwrap();
        assert_eq!(seed.allowed_domain(), "blog.example.com");
        assert_eq!(
            seed.start_url().as_str(),
            "http://blog.example.com/index.html"
        );
    }

    #[test]
    fn test_seed_keeps_explicit_domain() {
        let seed = SeedConfig::new("http://blog.example.com/", Some("Example.com")).unwrap();
        assert_eq!(seed.allowed_domain(), "example.com");
    }

    #[test]
    fn test_seed_allows_subdomains_of_domain() {
        let seed = SeedConfig::new("http://example.com/", None).unwrap();
        assert!(seed.allows(&Url::parse("https://blog.example.com/post").unwrap()));
        assert!(!seed.allows(&Url::parse("https://elsewhere.org/").unwrap()));
    }

    #[test]
    fn test_seed_rejects_invalid_start_url() {
        assert!(SeedConfig::new("::nonsense::", None).is_err());
    }
}
