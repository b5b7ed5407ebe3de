//! Link extraction for feed discovery and feed parsing
//!
//! This module handles:
//! - Guessing feed URLs from a start page (most likely first)
//! - Reading the ordered entry links out of an RSS or Atom feed
//! - Pulling the title out of an HTML page

use crate::CrawlError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Lazy, ordered stream of candidate feed URLs
///
/// Consumed one element at a time; restarting means extracting a new stream.
pub type CandidateStream = Box<dyn Iterator<Item = Url> + Send>;

/// Paths commonly serving a site's feed, tried after everything the page declares
const WELL_KNOWN_FEED_PATHS: &[&str] = &[
    "/feed",
    "/rss",
    "/feed.xml",
    "/rss.xml",
    "/atom.xml",
    "/index.xml",
    "/?feed=rss2",
];

/// Media types that mark a `<link rel="alternate">` as a feed
const FEED_MEDIA_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/rdf+xml",
    "application/xml",
    "text/xml",
];

/// Extracts feed candidates from start pages and entry links from feeds
pub trait LinkExtractor: Send + Sync {
    /// Returns candidate feed URLs found in (or guessed from) a start page
    fn feed_candidates(&self, html: &str, base_url: &Url) -> CandidateStream;

    /// Returns the entry links of a feed, in document order
    fn entry_links(&self, feed_body: &str, feed_url: &Url) -> Result<Vec<Url>, CrawlError>;
}

/// Link extractor backed by `scraper` for HTML and `quick-xml` for feeds
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLinkExtractor;

impl LinkExtractor for DefaultLinkExtractor {
    fn feed_candidates(&self, html: &str, base_url: &Url) -> CandidateStream {
        feed_candidates(html, base_url)
    }

    fn entry_links(&self, feed_body: &str, feed_url: &Url) -> Result<Vec<Url>, CrawlError> {
        extract_entry_links(feed_body, feed_url)
    }
}

/// Builds the candidate stream for a start page
///
/// # Candidate Order
///
/// 1. `<link rel="alternate">` with a feed media type
/// 2. `<a href>` whose target looks like a feed (`rss`, `atom`, `feed`, `.xml`)
/// 3. Well-known feed paths on the start page's host, produced lazily
///
/// Each URL is yielded at most once.
///
/// # Example
///
/// ```
/// use bibcrawl::crawler::feed_candidates;
/// use url::Url;
///
/// let html = r#"<html><head>
///   <link rel="alternate" type="application/rss+xml" href="/posts.rss">
/// </head></html>"#;
/// let base = Url::parse("https://blog.example.com/").unwrap();
/// let mut candidates = feed_candidates(html, &base);
/// assert_eq!(candidates.next().unwrap().as_str(), "https://blog.example.com/posts.rss");
/// ```
pub fn feed_candidates(html: &str, base_url: &Url) -> CandidateStream {
    let (declared, anchors) = {
        let document = Html::parse_document(html);
        (
            declared_feed_links(&document, base_url),
            anchor_feed_links(&document, base_url),
        )
    };

    let base = base_url.clone();
    let guesses = WELL_KNOWN_FEED_PATHS
        .iter()
        .filter_map(move |path| base.join(path).ok());

    let mut seen = HashSet::new();
    Box::new(
        declared
            .into_iter()
            .chain(anchors)
            .chain(guesses)
            .filter(move |url| seen.insert(url.clone())),
    )
}

/// Collects `<link rel="alternate" type="...feed type..." href>` targets
fn declared_feed_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("link[rel~='alternate'][href]") {
        for element in document.select(&selector) {
            let media_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_lowercase())
                .unwrap_or_default();

            if !FEED_MEDIA_TYPES.contains(&media_type.as_str()) {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Collects anchors that point at something feed-like
fn anchor_feed_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let lowered = href.to_lowercase();
            let looks_like_feed = lowered.contains("rss")
                || lowered.contains("atom")
                || lowered.contains("feed")
                || lowered.ends_with(".xml");

            if looks_like_feed {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Which text node of an RSS item is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Link,
    Guid,
}

/// Per-entry parse state
#[derive(Debug, Default)]
struct EntryState {
    link: String,
    guid: String,
    guid_is_permalink: bool,
    atom_href: Option<String>,
}

impl EntryState {
    fn into_link(self) -> Option<String> {
        if let Some(href) = self.atom_href {
            return Some(href);
        }

        let link = self.link.trim();
        if !link.is_empty() {
            return Some(link.to_string());
        }

        let guid = self.guid.trim();
        if self.guid_is_permalink && !guid.is_empty() {
            return Some(guid.to_string());
        }

        None
    }
}

/// Extracts the entry links of an RSS 0.9x/1.0/2.0 or Atom feed
///
/// RSS items contribute their `<link>` text, falling back to a permalink
/// `<guid>`; Atom entries contribute the `href` of their first `<link>` whose
/// `rel` is absent or `alternate`. Links are resolved against the feed URL,
/// kept in document order, and duplicates are preserved.
///
/// # Errors
///
/// Returns `CrawlError::FeedParse` if the XML is malformed or its root is
/// not `rss`, `feed`, or `RDF`.
///
/// # Example
///
/// ```
/// use bibcrawl::crawler::extract_entry_links;
/// use url::Url;
///
/// let xml = r#"<rss version="2.0"><channel>
///   <link>https://blog.example.com/</link>
///   <item><link>https://blog.example.com/a</link></item>
///   <item><link>/b</link></item>
/// </channel></rss>"#;
/// let feed_url = Url::parse("https://blog.example.com/feed").unwrap();
/// let links = extract_entry_links(xml, &feed_url).unwrap();
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[1].as_str(), "https://blog.example.com/b");
/// ```
pub fn extract_entry_links(xml: &str, feed_url: &Url) -> Result<Vec<Url>, CrawlError> {
    let parse_error = |message: String| CrawlError::FeedParse {
        url: feed_url.to_string(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut raw_links = Vec::new();
    let mut root: Option<String> = None;
    let mut entry: Option<EntryState> = None;
    let mut field: Option<ItemField> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if root.is_none() {
                    root = Some(name.clone());
                }

                match name.as_str() {
                    "item" | "entry" => {
                        entry = Some(EntryState::default());
                        field = None;
                    }
                    "link" => {
                        if let Some(state) = entry.as_mut() {
                            if !read_atom_link(&e, state).map_err(&parse_error)? {
                                field = Some(ItemField::Link);
                            }
                        }
                    }
                    "guid" => {
                        if let Some(state) = entry.as_mut() {
                            state.guid_is_permalink = e
                                .try_get_attribute("isPermaLink")
                                .map_err(|err| parse_error(err.to_string()))?
                                .map(|attr| &*attr.value != b"false")
                                .unwrap_or(true);
                            field = Some(ItemField::Guid);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                if root.is_none() {
                    root = Some(name.clone());
                }

                if name == "link" {
                    if let Some(state) = entry.as_mut() {
                        read_atom_link(&e, state).map_err(&parse_error)?;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(state), Some(current)) = (entry.as_mut(), field) {
                    let text = e.unescape().map_err(|err| parse_error(err.to_string()))?;
                    push_field_text(state, current, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(state), Some(current)) = (entry.as_mut(), field) {
                    push_field_text(state, current, &String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if matches!(name.as_str(), "item" | "entry") {
                    if let Some(link) = entry.take().and_then(EntryState::into_link) {
                        raw_links.push(link);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    match root.as_deref() {
        Some("rss") | Some("feed") | Some("RDF") => {}
        Some(other) => return Err(parse_error(format!("<{}> is not a feed root", other))),
        None => return Err(parse_error("empty document".to_string())),
    }

    let mut links = Vec::with_capacity(raw_links.len());
    for raw in raw_links {
        match feed_url.join(&raw) {
            Ok(url) => links.push(url),
            Err(e) => tracing::debug!("Skipping unresolvable entry link {}: {}", raw, e),
        }
    }

    Ok(links)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// Reads an Atom `<link href>` into the entry state
///
/// Returns true if the element carried an `href` (Atom style), false if it
/// is an RSS text link.
fn read_atom_link(e: &BytesStart<'_>, state: &mut EntryState) -> Result<bool, String> {
    let href = e.try_get_attribute("href").map_err(|err| err.to_string())?;
    let Some(href) = href else {
        return Ok(false);
    };

    let rel = e
        .try_get_attribute("rel")
        .map_err(|err| err.to_string())?
        .map(|attr| attr.unescape_value().map(|v| v.to_string()))
        .transpose()
        .map_err(|err| err.to_string())?;

    let is_alternate = rel.as_deref().map_or(true, |rel| rel == "alternate");
    if is_alternate && state.atom_href.is_none() {
        let value = href.unescape_value().map_err(|err| err.to_string())?;
        state.atom_href = Some(value.trim().to_string());
    }

    Ok(true)
}

fn push_field_text(state: &mut EntryState, field: ItemField, text: &str) {
    match field {
        ItemField::Link => state.link.push_str(text),
        ItemField::Guid => state.guid.push_str(text),
    }
}

/// Extracts the page title from an HTML document
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
