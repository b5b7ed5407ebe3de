//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use bibcrawl::config::Config;
use bibcrawl::crawler::{run_crawl, Action, ContentExtractor, EntryHandler, FetchedEntry};
use bibcrawl::state::CrawlPhase;
use bibcrawl::CrawlError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Emits the source URL of every entry and remembers each invocation
#[derive(Default)]
struct RecordingHandler {
    calls: usize,
    titles: Vec<Option<String>>,
}

impl EntryHandler for RecordingHandler {
    type Item = String;

    fn handle_entries(
        &mut self,
        entries: Vec<FetchedEntry>,
        extractor: &dyn ContentExtractor,
    ) -> Vec<Action<String>> {
        self.calls += 1;
        self.titles = extractor.pages().iter().map(|p| p.title.clone()).collect();
        entries
            .into_iter()
            .map(|entry| Action::Emit(entry.source_url.path().to_string()))
            .collect()
    }
}

fn test_config(base_url: &str) -> Config {
    let mut config = Config::for_seed(format!("{}/", base_url), None);
    config.fetch.timeout_secs = 5;
    config.fetch.connect_timeout_secs = 2;
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "application/rss+xml")
}

fn entry_page(title: &str) -> ResponseTemplate {
    html(format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, title
    ))
}

#[tokio::test]
async fn test_full_crawl_with_candidate_retry_and_failed_entry() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Start page declares a broken feed first, then the real one
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head>
                <link rel="alternate" type="application/rss+xml" href="/missing.xml">
                <link rel="alternate" type="application/rss+xml" href="/feed.xml">
            </head><body>Blog</body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(xml(format!(
            r#"<?xml version="1.0"?>
            <rss version="2.0"><channel><title>Blog</title>
                <item><title>One</title><link>{base}/post/1</link></item>
                <item><title>Two</title><link>{base}/post/2</link></item>
                <item><title>Three</title><link>/post/3</link></item>
            </channel></rss>"#,
            base = base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/1"))
        .respond_with(entry_page("First post"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/2"))
        .respond_with(entry_page("Second post"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let run = run_crawl(&test_config(&base_url), RecordingHandler::default())
        .await
        .expect("Crawl should start");

    let mut items = run.items.clone();
    items.sort();
    assert_eq!(items, vec!["/post/1".to_string(), "/post/2".to_string()]);

    let crawl = &run.crawl;
    assert_eq!(crawl.phase(), CrawlPhase::Complete);
    assert_eq!(crawl.handler().calls, 1);
    assert_eq!(crawl.handler().titles.len(), 2);
    assert!(crawl.error().is_none());

    let report = crawl.report();
    assert_eq!(report.candidates_tried, 2);
    assert_eq!(report.feed_url, Some(format!("{}/feed.xml", base_url)));
    assert_eq!(report.entries_expected, 3);
    assert_eq!(report.entries_fetched, 2);
    assert_eq!(report.entries_failed, 1);
    assert_eq!(report.pages_extracted, 2);

    assert_eq!(run.stats.requests_issued, 6);
    assert_eq!(run.stats.failures, 2);
    assert_eq!(run.stats.items, 2);
}

#[tokio::test]
async fn test_crawl_without_any_feed_is_abandoned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No declared feeds; every well-known path falls through to a 404,
    // and "/?feed=rss2" lands on this HTML page.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>No feeds here</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let run = run_crawl(&test_config(&base_url), RecordingHandler::default())
        .await
        .expect("Crawl should start");

    assert!(run.items.is_empty());
    assert_eq!(run.crawl.phase(), CrawlPhase::Abandoned);
    assert_eq!(run.crawl.handler().calls, 0);
    assert!(run.crawl.session().is_none());
    assert!(matches!(
        run.crawl.error(),
        Some(CrawlError::FeedDiscoveryExhausted { tried: 7 })
    ));
}

#[tokio::test]
async fn test_feed_without_entries_still_reaches_handler() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head>
                <link rel="alternate" type="application/atom+xml" href="/atom.xml">
            </head></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/atom.xml"))
        .respond_with(xml(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Quiet blog</title></feed>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let run = run_crawl(&test_config(&base_url), RecordingHandler::default())
        .await
        .expect("Crawl should start");

    assert!(run.items.is_empty());
    assert_eq!(run.crawl.phase(), CrawlPhase::Complete);
    assert_eq!(run.crawl.handler().calls, 1);
    assert_eq!(run.crawl.report().entries_expected, 0);
}

#[tokio::test]
async fn test_redirected_entry_keeps_its_source_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><a href="/feed/atom">Subscribe</a></body></html>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed/atom"))
        .respond_with(xml(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <entry><title>Moved</title><link href="/old-post"/></entry>
            </feed>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old-post"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new-post", base_url).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new-post"))
        .respond_with(entry_page("Moved post"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let run = run_crawl(&test_config(&base_url), RecordingHandler::default())
        .await
        .expect("Crawl should start");

    assert_eq!(run.items, vec!["/old-post".to_string()]);
    assert_eq!(
        run.crawl.handler().titles,
        vec![Some("Moved post".to_string())]
    );
}

#[tokio::test]
async fn test_start_page_failure_abandons_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let run = run_crawl(&test_config(&base_url), RecordingHandler::default())
        .await
        .expect("Crawl should start");

    assert_eq!(run.crawl.phase(), CrawlPhase::Abandoned);
    assert_eq!(run.crawl.report().candidates_tried, 0);
    assert_eq!(run.stats.requests_issued, 1);
    assert!(matches!(
        run.crawl.error(),
        Some(CrawlError::StartPageFailed { .. })
    ));
}
