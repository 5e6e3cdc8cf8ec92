//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the news site and run the full
//! crawl cycle end-to-end into a temporary output directory.

use std::time::{Duration, Instant};
use tempfile::TempDir;
use tintuc::config::{Config, CrawlerConfig, OutputConfig, SelectorsConfig, SiteConfig};
use tintuc::fetch::build_http_client;
use tintuc::{Crawler, Fetcher, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_selectors() -> SelectorsConfig {
    SelectorsConfig {
        nav_menu: "div.header__menu".to_string(),
        nav_item: "ul > li".to_string(),
        nav_link: vec!["a.nav-link".to_string(), "a".to_string()],
        breadcrumb: "div.list__breadcrumb li a".to_string(),
        listing_containers: vec![
            "div[class*=\"box-category\"]".to_string(),
            "div[class*=\"box-stream\"]".to_string(),
        ],
        listing_headings: "h2, h3".to_string(),
        thumbnail: vec![
            "div.box-category-item img".to_string(),
            "div[class*=\"box\"] img".to_string(),
        ],
        sapo: vec!["div.box-category-item p".to_string(), "p.sapo".to_string()],
        time: vec!["span.time".to_string(), "span.date".to_string()],
        content: "div.detail-content".to_string(),
        detail_time: vec!["div.detail-time".to_string(), "span.time".to_string()],
        featured_image: vec!["div.detail-content img".to_string()],
        meta_published_time: "meta[property=\"article:published_time\"]".to_string(),
    }
}

/// Creates a test configuration pointed at the mock server
fn test_config(base_url: &str, retry_delay_secs: u64) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            source_id: "news.example.vn".to_string(),
            article_suffix: ".htm".to_string(),
            user_agent: "tintuc-test/1.0".to_string(),
            excluded_categories: vec!["trang chủ".to_string()],
        },
        crawler: CrawlerConfig {
            max_retries: 3,
            retry_delay_secs,
            request_timeout_secs: 5,
            delay_between_requests_ms: 0,
            delay_between_subcategories_ms: 0,
            delay_between_categories_ms: 0,
            max_categories: None,
            max_subcategories: None,
            max_articles: 5,
        },
        output: OutputConfig {
            base_dir: "./unused".to_string(),
            mapping_file: "category_mapping.csv".to_string(),
        },
        selectors: test_selectors(),
    }
}

const NAV_PAGE: &str = r#"<html><body>
    <div class="header__menu"><ul>
        <li><a class="nav-link" href="/">Trang chủ</a></li>
        <li><a class="nav-link" href="/chinh-tri">Chính trị</a></li>
    </ul></div>
</body></html>"#;

const ARTICLE_PAGE: &str = r#"<html><body>
    <div class="detail-time">Thứ ba, 03/02/2026 09:15</div>
    <div class="detail-content">
        <p>Đây là đoạn văn đầu tiên của bài báo thử nghiệm, đủ dài để được giữ lại.</p>
        <p>Đoạn văn thứ hai cũng đủ dài để vượt qua ngưỡng hai mươi ký tự.</p>
        <p><b>Minh Anh</b></p>
    </div>
</body></html>"#;

async fn mount_html(server: &MockServer, url_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_stores_articles_and_metadata() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", NAV_PAGE).await;

    // Category page: two articles and one subcategory in the breadcrumb.
    mount_html(
        &mock_server,
        "/chinh-tri",
        r#"<html><body>
            <div class="list__breadcrumb"><ul>
                <li><a href="/">Trang chủ</a></li>
                <li><a href="/chinh-tri">Chính trị</a></li>
                <li><a href="/chinh-tri/doi-ngoai">Đối ngoại</a></li>
            </ul></div>
            <div class="box-category">
                <div class="box-category-item">
                    <h3><a href="/bai-1.htm">Bài một</a></h3>
                    <p>Sapo của bài một, dài hơn một câu bình thường.</p>
                </div>
            </div>
            <div class="box-stream"><h2><a href="/bai-2.htm">Bài hai</a></h2></div>
        </body></html>"#,
    )
    .await;

    mount_html(
        &mock_server,
        "/chinh-tri/doi-ngoai",
        r#"<html><body>
            <div class="box-stream"><h2><a href="/bai-sub.htm">Bài phụ</a></h2></div>
        </body></html>"#,
    )
    .await;

    mount_html(&mock_server, "/bai-1.htm", ARTICLE_PAGE).await;
    mount_html(&mock_server, "/bai-2.htm", ARTICLE_PAGE).await;
    mount_html(&mock_server, "/bai-sub.htm", ARTICLE_PAGE).await;

    let output = TempDir::new().unwrap();
    let mut crawler = Crawler::new(test_config(&base_url, 0), output.path())
        .expect("failed to create crawler");
    let stats = crawler.run().await.expect("crawl failed");

    assert_eq!(stats.categories, 1);
    assert_eq!(stats.subcategories, 1);
    assert_eq!(stats.articles, 3);

    let category_dir = output.path().join("chinh_tri").join("category");
    for i in 1..=2 {
        assert!(category_dir
            .join("article")
            .join(format!("article_{}.txt", i))
            .exists());
        assert!(category_dir
            .join("metadata")
            .join(format!("metadata_{}.json", i))
            .exists());
    }

    // Subcategory counter is independent of the parent's.
    let sub_dir = output
        .path()
        .join("chinh_tri")
        .join("sub-category")
        .join("doi_ngoai");
    assert!(sub_dir.join("article").join("article_1.txt").exists());

    let body =
        std::fs::read_to_string(category_dir.join("article").join("article_1.txt")).unwrap();
    assert!(body.starts_with("Đây là đoạn văn đầu tiên"));
    assert!(body.contains("\n\n"));
    assert!(!body.contains("Minh Anh"));

    let metadata: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(category_dir.join("metadata").join("metadata_1.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(metadata["index"], 1);
    assert_eq!(metadata["category"], "Chính trị");
    assert_eq!(metadata["category_normalized"], "chinh_tri");
    assert_eq!(metadata["category_display"], "CHÍNH TRỊ");
    assert_eq!(metadata["author"], "Minh Anh");
    assert_eq!(metadata["date"], "03/02/2026");
    assert_eq!(metadata["source"], "news.example.vn");
    assert_eq!(
        metadata["url"],
        format!("{}/bai-1.htm", base_url)
    );

    let mapping =
        std::fs::read_to_string(output.path().join("category_mapping.csv")).unwrap();
    assert!(mapping.contains("chinh_tri,Chính trị,CHÍNH TRỊ"));
    assert!(mapping.contains("doi_ngoai,Đối ngoại,ĐỐI NGOẠI"));
}

#[tokio::test]
async fn test_fetch_retries_exactly_max_attempts() {
    let mock_server = MockServer::start().await;

    // Every attempt fails; the mock verifies exactly 3 requests on drop.
    Mock::given(method("GET"))
        .and(path("/fail"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri(), 1);
    let client = build_http_client(&config.site, &config.crawler).unwrap();
    let fetcher = Fetcher::with_policy(client, RetryPolicy::new(3, Duration::from_secs(1)));

    let start = Instant::now();
    let result = fetcher.fetch(&format!("{}/fail", mock_server.uri())).await;
    let elapsed = start.elapsed();

    let error = result.expect_err("fetch should fail after retries");
    assert_eq!(error.attempts, 3);

    // Two inter-attempt delays of one second each.
    assert!(
        elapsed.as_secs_f64() >= 2.0,
        "expected at least 2s of retry delays, got {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_malformed_listing_entry_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", NAV_PAGE).await;

    // Two valid links and one with no title text.
    mount_html(
        &mock_server,
        "/chinh-tri",
        r#"<html><body>
            <div class="box-stream"><h2><a href="/bai-1.htm">Bài một</a></h2></div>
            <div class="box-stream"><h2><a href="/khong-tieu-de.htm">   </a></h2></div>
            <div class="box-stream"><h2><a href="/bai-2.htm">Bài hai</a></h2></div>
        </body></html>"#,
    )
    .await;

    mount_html(&mock_server, "/bai-1.htm", ARTICLE_PAGE).await;
    mount_html(&mock_server, "/bai-2.htm", ARTICLE_PAGE).await;

    // The titleless link must never be fetched.
    Mock::given(method("GET"))
        .and(path("/khong-tieu-de.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let mut crawler = Crawler::new(test_config(&base_url, 0), output.path())
        .expect("failed to create crawler");
    let stats = crawler.run().await.expect("crawl failed");

    assert_eq!(stats.articles, 2);

    let article_dir = output
        .path()
        .join("chinh_tri")
        .join("category")
        .join("article");
    assert!(article_dir.join("article_1.txt").exists());
    assert!(article_dir.join("article_2.txt").exists());
    assert!(!article_dir.join("article_3.txt").exists());
}

#[tokio::test]
async fn test_article_without_content_container_is_not_saved() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", NAV_PAGE).await;
    mount_html(
        &mock_server,
        "/chinh-tri",
        r#"<html><body>
            <div class="box-stream"><h2><a href="/bai-rong.htm">Bài rỗng</a></h2></div>
        </body></html>"#,
    )
    .await;

    // Article page with no content container at all.
    mount_html(
        &mock_server,
        "/bai-rong.htm",
        "<html><body><p>Trang không có nội dung bài.</p></body></html>",
    )
    .await;

    let output = TempDir::new().unwrap();
    let mut crawler = Crawler::new(test_config(&base_url, 0), output.path())
        .expect("failed to create crawler");
    let stats = crawler.run().await.expect("crawl failed");

    // The round was attempted, so the category counts, but nothing was saved.
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.articles, 0);
    assert!(!output.path().join("chinh_tri").exists());
}

#[tokio::test]
async fn test_failing_article_does_not_abort_the_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/", NAV_PAGE).await;
    mount_html(
        &mock_server,
        "/chinh-tri",
        r#"<html><body>
            <div class="box-stream"><h2><a href="/bai-hong.htm">Bài hỏng</a></h2></div>
            <div class="box-stream"><h2><a href="/bai-tot.htm">Bài tốt</a></h2></div>
        </body></html>"#,
    )
    .await;

    // The first article fails on every attempt; the second succeeds.
    Mock::given(method("GET"))
        .and(path("/bai-hong.htm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/bai-tot.htm", ARTICLE_PAGE).await;

    let output = TempDir::new().unwrap();
    let mut crawler = Crawler::new(test_config(&base_url, 0), output.path())
        .expect("failed to create crawler");
    let stats = crawler.run().await.expect("crawl failed");

    assert_eq!(stats.categories, 1);
    assert_eq!(stats.articles, 1);

    let metadata: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(
            output
                .path()
                .join("chinh_tri")
                .join("category")
                .join("metadata")
                .join("metadata_1.json"),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(metadata["title"], "Bài tốt");
}
