//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl session end-to-end: availability check, robots.txt, frontier,
//! fetching, parsing and persistence.

use site_auditor::config::{parse_config, Config};
use site_auditor::crawler::FailureKind;
use site_auditor::storage::PageStore;
use site_auditor::{AuditError, PageRecord, Scraper};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given base URL
///
/// `crawler` is inserted verbatim into the `[crawler]` table.
fn create_test_config(base_url: &str, crawler: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
base-url = "{base_url}"

[user-agent]
crawler-name = "TestAuditor"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"

[crawler]
timeout-secs = 5
max-retries = 1
crawl-delay = 0.0
{crawler}

[seo]
keywords = ["rental"]
"#
    ))
    .expect("test config should be valid")
}

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(title, links))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn urls(pages: &[PageRecord], base: &str) -> Vec<String> {
    pages
        .iter()
        .map(|p| p.url.trim_start_matches(base).to_string())
        .collect()
}

#[tokio::test]
async fn test_crawl_respects_robots_disallow() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private\n").await;
    mount_page(&mock_server, "/", "Home", &["/a", "/b", "/private"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Private", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "max-pages = 10");
    let mut scraper = Scraper::new(&config).expect("Failed to create scraper");
    let pages = scraper
        .scrape_site(10, Duration::ZERO, true)
        .await
        .expect("Crawl should succeed");

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a", "/b"]);
    assert_eq!(scraper.stats().skipped_by_robots, 1);

    let home = &pages[0];
    assert_eq!(home.status_code, 200);
    assert_eq!(home.meta("title"), Some("Home"));
    assert_eq!(home.extracted_links.len(), 3);
    assert!(home.extracted_links[2].ends_with("/private"));
}

#[tokio::test]
async fn test_crawl_ignores_robots_when_disabled() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private\n").await;
    mount_page(&mock_server, "/", "Home", &["/a", "/b", "/private"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;
    mount_page(&mock_server, "/private", "Private", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, false).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a", "/b", "/private"]);
}

#[tokio::test]
async fn test_robots_disallow_with_cyrillic_path() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /аренда\n").await;
    mount_page(&mock_server, "/", "Home", &["/аренда/лыжи", "/a"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    Mock::given(method("GET"))
        .and(path("/%D0%B0%D1%80%D0%B5%D0%BD%D0%B4%D0%B0/%D0%BB%D1%8B%D0%B6%D0%B8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Skis", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    assert_eq!(scraper.stats().skipped_by_robots, 1);
}

#[tokio::test]
async fn test_canonical_link_is_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head><link rel="canonical" href="/canon"></head>
                    <body><a href="/a">A</a></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    Mock::given(method("GET"))
        .and(path("/canon"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Canon", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, false).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    assert_eq!(pages[0].extracted_links.len(), 1);
    assert_eq!(pages[0].meta("canonical"), Some(format!("{}/canon", base_url).as_str()));
}

#[tokio::test]
async fn test_agent_specific_robots_group() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(
        &mock_server,
        "User-agent: OtherBot\nDisallow: /a\n\nUser-agent: TestAuditor\nDisallow: /b\n",
    )
    .await;
    mount_page(&mock_server, "/", "Home", &["/a", "/b"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No /robots.txt mock: wiremock answers 404
    mount_page(&mock_server, "/", "Home", &["/private"]).await;
    mount_page(&mock_server, "/private", "Private", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/private"]);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/a", "/b"]).await;
    mount_page(&mock_server, "/a", "A", &["/c"]).await;
    mount_page(&mock_server, "/b", "B", &["/d", "/a"]).await;
    mount_page(&mock_server, "/c", "C", &[]).await;
    mount_page(&mock_server, "/d", "D", &["/"]).await;

    let config = create_test_config(&base_url, "");

    let mut first = Scraper::new(&config).unwrap();
    let first_run = first.scrape_site(10, Duration::ZERO, true).await.unwrap();
    assert_eq!(urls(&first_run, &base_url), vec!["/", "/a", "/b", "/c", "/d"]);

    let mut second = Scraper::new(&config).unwrap();
    let second_run = second.scrape_site(10, Duration::ZERO, true).await.unwrap();
    assert_eq!(urls(&first_run, &base_url), urls(&second_run, &base_url));
}

#[tokio::test]
async fn test_max_pages_cap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/a", "/b", "/c", "/d"]).await;
    for route in ["/a", "/b", "/c", "/d"] {
        mount_page(&mock_server, route, route, &[]).await;
    }

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(3, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a", "/b"]);
    assert_eq!(scraper.stats().left_in_frontier, 2);
}

#[tokio::test]
async fn test_no_duplicate_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &["/a", "/a#top", "/a?utm_source=mail", "/b", "/./b", "/a/../b"],
    )
    .await;
    mount_page(&mock_server, "/a", "A", &["/", "/b"]).await;
    mount_page(&mock_server, "/b", "B", &["/a", "/"]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    let unique: HashSet<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(unique.len(), pages.len());
    assert_eq!(urls(&pages, &base_url), vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_external_links_are_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &["https://other.example/", "mailto:team@example.com", "/a"],
    )
    .await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    assert!(pages[0]
        .extracted_links
        .iter()
        .any(|l| l == "https://other.example/"));
}

#[tokio::test]
async fn test_http_error_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/missing", "/a"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        // HTTP errors are not retried
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    assert_eq!(scraper.stats().failures.get("http_404"), Some(&1));
}

#[tokio::test]
async fn test_timeout_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/slow", "/a"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow", &[]))
                .set_delay(Duration::from_secs(3)),
        )
        // One request per allowed attempt
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = parse_config(&format!(
        r#"
[site]
base-url = "{base_url}"

[user-agent]
crawler-name = "TestAuditor"
crawler-version = "1.0.0"

[crawler]
timeout-secs = 1
max-retries = 2
crawl-delay = 0.0

[seo]
keywords = ["rental"]
"#
    ))
    .unwrap();

    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    assert_eq!(scraper.stats().failures.get("timeout"), Some(&1));
}

#[tokio::test]
async fn test_unreachable_site_fails() {
    let config = create_test_config("http://127.0.0.1:1/", "");
    let mut scraper = Scraper::new(&config).unwrap();
    let result = scraper.scrape_site(10, Duration::ZERO, true).await;

    assert!(matches!(
        result,
        Err(AuditError::SiteUnreachable {
            kind: FailureKind::ConnectionError,
            ..
        })
    ));
}

#[tokio::test]
async fn test_server_error_on_base_url_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "");
    let mut scraper = Scraper::new(&config).unwrap();
    let result = scraper.scrape_site(10, Duration::ZERO, true).await;

    assert!(matches!(
        result,
        Err(AuditError::SiteUnreachable {
            kind: FailureKind::HttpError(503),
            ..
        })
    ));
}

#[tokio::test]
async fn test_crawl_delay_between_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/a", "/b"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();

    let started = std::time::Instant::now();
    let pages = scraper
        .scrape_site(10, Duration::from_millis(200), true)
        .await
        .unwrap();

    assert_eq!(pages.len(), 3);
    // Two pauses: none after the last page
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_no_delay_after_robots_skip() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /private\n").await;
    mount_page(&mock_server, "/", "Home", &["/private", "/a"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();

    let started = std::time::Instant::now();
    let pages = scraper
        .scrape_site(10, Duration::from_millis(500), true)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(urls(&pages, &base_url), vec!["/", "/a"]);
    // One pause after "/", none after the skipped "/private"
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(1000));
}

#[tokio::test]
async fn test_save_and_load_data() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/a"]).await;
    mount_page(&mock_server, "/a", "Рента", &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data/scraped_data.json");

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config).unwrap();
    let pages = scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();
    scraper.save_data(&data_path).unwrap();

    let mut reader = Scraper::new(&config).unwrap();
    let loaded = reader.load_data(&data_path).unwrap();

    assert_eq!(loaded, pages.as_slice());
    assert_eq!(loaded[1].meta("title"), Some("Рента"));
}

#[tokio::test]
async fn test_checkpoint_writes_partial_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Home", &["/a", "/b"]).await;
    mount_page(&mock_server, "/a", "A", &[]).await;
    mount_page(&mock_server, "/b", "B", &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let checkpoint_path = dir.path().join("checkpoint.json");

    let config = create_test_config(&base_url, "");
    let mut scraper = Scraper::new(&config)
        .unwrap()
        .with_checkpoint(&checkpoint_path, 2);
    scraper.scrape_site(10, Duration::ZERO, true).await.unwrap();

    let saved = PageStore::load(&checkpoint_path).unwrap();
    assert_eq!(saved.len(), 2);
}
