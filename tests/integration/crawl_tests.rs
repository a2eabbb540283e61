//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full label crawl cycle end-to-end.

use merch_ripple::config::Config;
use merch_ripple::crawler::{build_http_client, scrape_item_url, CrawlFailure, FetchError, Fetcher, RetryPolicy};
use merch_ripple::{Coordinator, MerchRecord};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LABEL_MERCH_HTML: &str = include_str!("../fixtures/label_merch.html");
const ALBUM_25_HTML: &str = include_str!("../fixtures/album_25.html");
const ALBUM_26_HTML: &str = include_str!("../fixtures/album_26.html");
const BLUE_ALBUM_HTML: &str = include_str!("../fixtures/blue_album.html");
const PINK_ALBUM_HTML: &str = include_str!("../fixtures/pink_album.html");

const TELEPATH: &str = "t e l e p a t h テレパシー能力者";
const BLUE_TITLE: &str = "・過世的購物中心蕭條導瀉檔案完畢世界・  (Blue Album)";
const PINK_TITLE: &str = "・薔薇綺麗躊躇網羅就職痙攣蝋燭鷹麟爨齉馕龘爨齉龘・  (Pink Album)";

/// Creates a test configuration without backoff sleeps
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.fetcher.base_delay_ms = 0;
    config.fetcher.request_timeout_secs = 5;
    config
}

fn create_fetcher(max_retries: u32) -> Fetcher {
    let config = create_test_config();
    let client = build_http_client(&config.fetcher).expect("Failed to build client");
    Fetcher::new(client, RetryPolicy::new(Duration::ZERO, max_retries))
}

async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_delayed_page(server: &MockServer, page_path: &str, html: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html).set_delay(delay))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page_path: &str, status: u16, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_label(server: &MockServer) {
    mount_page(server, "/test_label_merch_url", LABEL_MERCH_HTML).await;
    mount_page(server, "/album/--25", ALBUM_25_HTML).await;
    mount_page(server, "/album/--26", ALBUM_26_HTML).await;
    mount_page(server, "/album/blue-album", BLUE_ALBUM_HTML).await;
    mount_page(server, "/album/pink-album", PINK_ALBUM_HTML).await;
}

#[allow(clippy::too_many_arguments)]
fn record(
    artist: &str,
    edition_of: Option<i64>,
    id: u64,
    image_id: u64,
    merch_type: &str,
    price: f64,
    release_date: &str,
    remaining: Option<i64>,
    title: &str,
    slug: &str,
) -> MerchRecord {
    MerchRecord {
        artist: artist.to_string(),
        currency: "USD".to_string(),
        edition_of,
        id,
        image_id,
        label: "Geometric Lullaby".to_string(),
        merch_type: merch_type.to_string(),
        price,
        release_date: release_date.to_string(),
        remaining,
        timestamp: "2022-09-07T11:12:09.227903".to_string(),
        title: title.to_string(),
        url: format!("https://geometriclullaby.bandcamp.com/album/{}", slug),
    }
}

/// Records in listing order: the featured item comes first
fn expected_label_records() -> Vec<MerchRecord> {
    vec![
        record(
            "鬱", Some(333), 965252114, 29195359, "Vinyl", 35.0,
            "25 Jan 2022 19:45:57 GMT", Some(88), BLUE_TITLE, "blue-album",
        ),
        record(
            TELEPATH, None, 2281430982, 29606615, "Cassette", 15.0,
            "23 Aug 2022 02:32:07 GMT", None, "現実を超えて", "--26",
        ),
        record(
            TELEPATH, None, 2963618744, 29606590, "Cassette", 15.0,
            "23 Aug 2022 02:28:52 GMT", None, "アンタラ通信", "--25",
        ),
        record(
            TELEPATH, None, 524554060, 26919027, "Vinyl", 44.44,
            "23 Nov 2021 08:52:26 GMT", Some(78), "アンタラ通信", "--25",
        ),
        record(
            "鬱", Some(333), 401367820, 29195372, "Vinyl", 30.0,
            "25 Jan 2022 19:48:11 GMT", Some(71), PINK_TITLE, "pink-album",
        ),
    ]
}

#[tokio::test]
async fn test_crawl_label_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_label(&mock_server).await;

    // Sold-out listing entries are never visited
    mount_status(&mock_server, "/album/sold-out-tape", 200, 0).await;

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator
        .crawl_label(&format!("{}/test_label_merch_url", mock_server.uri()))
        .await;

    assert_eq!(records, expected_label_records());
    assert!(records
        .iter()
        .all(|r| r.remaining.map_or(true, |remaining| remaining > 0)));
}

#[tokio::test]
async fn test_records_of_one_page_share_timestamp() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/album/--25", ALBUM_25_HTML).await;

    let fetcher = create_fetcher(0);
    let records = scrape_item_url(&fetcher, &format!("{}/album/--25", mock_server.uri()))
        .await
        .expect("Item page should be scraped");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, records[1].timestamp);
    assert!(!records[0].timestamp.is_empty());
}

#[tokio::test]
async fn test_listing_without_items_is_scraped_as_item_page() {
    let mock_server = MockServer::start().await;

    // The seed is fetched once as a listing and once more as an item page
    Mock::given(method("GET"))
        .and(path("/album/--25"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ALBUM_25_HTML))
        .expect(2)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator
        .crawl_label(&format!("{}/album/--25", mock_server.uri()))
        .await;

    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2963618744, 524554060]);
}

#[tokio::test]
async fn test_page_without_items_or_payload_yields_empty() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/empty", "<html><body><p>Nothing here</p></body></html>").await;

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator
        .crawl_label(&format!("{}/empty", mock_server.uri()))
        .await;

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_seed_failures_yield_empty() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/missing", 404, 1).await;
    mount_status(&mock_server, "/limited", 429, 3).await;

    let mut config = create_test_config();
    config.fetcher.max_retries = 2;
    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");

    assert!(coordinator
        .crawl_label(&format!("{}/missing", mock_server.uri()))
        .await
        .is_empty());
    assert!(coordinator
        .crawl_label(&format!("{}/limited", mock_server.uri()))
        .await
        .is_empty());
}

#[tokio::test]
async fn test_failed_item_page_does_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/test_label_merch_url", LABEL_MERCH_HTML).await;
    mount_page(&mock_server, "/album/--25", ALBUM_25_HTML).await;
    mount_status(&mock_server, "/album/--26", 404, 1).await;
    mount_status(&mock_server, "/album/blue-album", 500, 1).await;
    mount_page(&mock_server, "/album/pink-album", "<html><body>no payload</body></html>").await;

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator
        .crawl_label(&format!("{}/test_label_merch_url", mock_server.uri()))
        .await;

    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2963618744, 524554060]);
}

#[tokio::test]
async fn test_crawl_labels_in_seed_order() {
    let first = MockServer::start().await;
    mount_page(&first, "/album/pink-album", PINK_ALBUM_HTML).await;

    let second = MockServer::start().await;
    mount_page(&second, "/album/--26", ALBUM_26_HTML).await;

    let seeds = vec![
        format!("{}/album/pink-album", first.uri()),
        format!("{}/not-mounted", second.uri()),
        format!("{}/album/--26", second.uri()),
    ];

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator.crawl_labels(&seeds).await;

    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![401367820, 2281430982]);
}

#[tokio::test]
async fn test_item_fetches_respect_concurrency_cap() {
    let delay = Duration::from_millis(300);
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/test_label_merch_url", LABEL_MERCH_HTML).await;
    mount_delayed_page(&mock_server, "/album/--25", ALBUM_25_HTML, delay).await;
    mount_delayed_page(&mock_server, "/album/--26", ALBUM_26_HTML, delay).await;
    mount_delayed_page(&mock_server, "/album/blue-album", BLUE_ALBUM_HTML, delay).await;
    mount_delayed_page(&mock_server, "/album/pink-album", PINK_ALBUM_HTML, delay).await;

    let mut config = create_test_config();
    config.crawler.max_concurrent_fetches = 1;
    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");

    let started = Instant::now();
    let records = coordinator
        .crawl_label(&format!("{}/test_label_merch_url", mock_server.uri()))
        .await;
    let elapsed = started.elapsed();

    // Four item pages fetched one at a time
    assert!(elapsed >= delay * 4, "elapsed {:?} with one fetch at a time", elapsed);
    assert_eq!(records, expected_label_records());
}

#[tokio::test]
async fn test_labels_respect_concurrency_cap() {
    let delay = Duration::from_millis(200);
    let mock_server = MockServer::start().await;
    mount_delayed_page(&mock_server, "/album/pink-album", PINK_ALBUM_HTML, delay).await;
    mount_delayed_page(&mock_server, "/album/--26", ALBUM_26_HTML, delay).await;
    mount_delayed_page(&mock_server, "/album/--25", ALBUM_25_HTML, delay).await;

    let seeds = vec![
        format!("{}/album/pink-album", mock_server.uri()),
        format!("{}/album/--26", mock_server.uri()),
        format!("{}/album/--25", mock_server.uri()),
    ];

    let mut config = create_test_config();
    config.crawler.max_concurrent_labels = 1;
    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");

    let started = Instant::now();
    let records = coordinator.crawl_labels(&seeds).await;
    let elapsed = started.elapsed();

    // Each label fetches its seed, then the same page again as an item page
    assert!(elapsed >= delay * 6, "elapsed {:?} with one label at a time", elapsed);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![401367820, 2281430982, 2963618744, 524554060]);
}

#[tokio::test]
async fn test_crawl_follows_redirects() {
    let mock_server = MockServer::start().await;
    mount_label(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/merch"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/test_label_merch_url", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(&create_test_config()).expect("Failed to create coordinator");
    let records = coordinator
        .crawl_label(&format!("{}/merch", mock_server.uri()))
        .await;

    assert_eq!(records.len(), 5);
}

#[tokio::test]
async fn test_rate_limit_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    // One initial request plus twelve retries
    mount_status(&mock_server, "/album/--25", 429, 13).await;

    let fetcher = create_fetcher(12);
    let url = format!("{}/album/--25", mock_server.uri());
    let result = fetcher.fetch(&url).await;

    match result {
        Err(FetchError::RateLimited { url: failed_url, attempts }) => {
            assert_eq!(failed_url, url);
            assert_eq!(attempts, 13);
        }
        other => panic!("Expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/album/--25"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/album/--25", ALBUM_25_HTML).await;

    let fetcher = create_fetcher(12);
    let records = scrape_item_url(&fetcher, &format!("{}/album/--25", mock_server.uri()))
        .await
        .expect("Item page should be scraped after retries");

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_rate_limit_backs_off_between_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/album/--26"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/album/--26", ALBUM_26_HTML).await;

    let client = build_http_client(&create_test_config().fetcher).expect("Failed to build client");
    let policy = RetryPolicy::new(Duration::from_millis(20), 12);
    let fetcher = Fetcher::new(client, policy);

    let started = Instant::now();
    let records = scrape_item_url(&fetcher, &format!("{}/album/--26", mock_server.uri()))
        .await
        .expect("Item page should be scraped after retries");
    let elapsed = started.elapsed();

    let minimum = policy.delay_bounds(1).0 + policy.delay_bounds(2).0;
    assert!(elapsed >= minimum, "elapsed {:?} < {:?}", elapsed, minimum);
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/album/gone", 404, 1).await;

    let fetcher = create_fetcher(12);
    let result = scrape_item_url(&fetcher, &format!("{}/album/gone", mock_server.uri())).await;

    assert!(matches!(
        result,
        Err(CrawlFailure::Fetch(FetchError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_unexpected_status_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/album/broken", 503, 1).await;

    let fetcher = create_fetcher(12);
    let result = fetcher
        .fetch(&format!("{}/album/broken", mock_server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(FetchError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_fetch_reports_final_url() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/album/--26", ALBUM_26_HTML).await;
    Mock::given(method("GET"))
        .and(path("/old-album"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("Location", format!("{}/album/--26", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    let fetcher = create_fetcher(0);
    let page = fetcher
        .fetch(&format!("{}/old-album", mock_server.uri()))
        .await
        .expect("Redirected page should be fetched");

    assert_eq!(page.final_url, format!("{}/album/--26", mock_server.uri()));
    assert!(page.body.contains("data-tralbum"));
}
