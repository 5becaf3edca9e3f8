//! HttpFetcher against a local mock server.

use sitecrawl::error::AppError;
use sitecrawl::models::CrawlerConfig;
use sitecrawl::services::{HttpFetcher, PageFetcher};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    let config = CrawlerConfig {
        user_agent: "SiteBot".to_string(),
        ..CrawlerConfig::default()
    };
    HttpFetcher::from_config(&config).unwrap()
}

#[tokio::test]
async fn fetches_html_with_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "SiteBot"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher()
        .fetch_page(&format!("{}/page", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<p>hi</p>");
}

#[tokio::test]
async fn error_status_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch_page(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    match err {
        AppError::Fetch { message, .. } => assert!(message.contains("404")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_html_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch_page(&format!("{}/report.pdf", server.uri()))
        .await;
    assert!(matches!(result, Err(AppError::Fetch { .. })));
}

#[tokio::test]
async fn robots_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /tmp\n"))
        .mount(&server)
        .await;

    let seed = Url::parse(&format!("{}/deep/page", server.uri())).unwrap();
    let robots = fetcher().fetch_robots(&seed).await;
    assert_eq!(robots.as_deref(), Some("User-agent: *\nDisallow: /tmp\n"));
}

#[tokio::test]
async fn robots_missing_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let seed = Url::parse(&server.uri()).unwrap();
    assert!(fetcher().fetch_robots(&seed).await.is_none());
}
