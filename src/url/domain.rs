use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use bibcrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the allowed domain of a crawl from its start URL
///
/// The authority's host is used; user info and port are not part of the
/// allowed domain.
///
/// # Errors
///
/// * `UrlError::Parse` - the start URL is not a URL
/// * `UrlError::InvalidScheme` - the start URL is not http(s)
/// * `UrlError::MissingDomain` - the start URL has no host
///
/// # Examples
///
/// ```
/// use bibcrawl::url::derive_domain;
///
/// let domain = derive_domain("http://blog.example.com/index.html").unwrap();
/// assert_eq!(domain, "blog.example.com");
/// ```
pub fn derive_domain(start_url: &str) -> UrlResult<String> {
    let url = parse_http_url(start_url)?;
    extract_domain(&url).ok_or(UrlError::MissingDomain)
}

/// Parses a URL and checks that it can be fetched over HTTP
pub fn parse_http_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
