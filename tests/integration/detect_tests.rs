//! Format detection tests against mock documentation sites

use crate::{base_url, page_html, sphinx_inventory, test_config, test_fetcher};
use autodocs_scrape::{detect_format, DocFormat};
use std::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/guide/</loc></url>
</urlset>"#;

#[tokio::test]
async fn objects_inv_classifies_sphinx() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // A sitemap also exists; priority order must still pick Sphinx
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
        .expect(0)
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::Sphinx);
}

#[tokio::test]
async fn sitemap_classifies_mkdocs_when_inventory_missing() {
    let server = MockServer::start().await;

    Mock::given(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::MkDocs);
}

#[tokio::test]
async fn malformed_sitemap_does_not_classify_mkdocs() {
    let server = MockServer::start().await;

    Mock::given(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url></urlset>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(page_html("Docs", "plain site")),
        )
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::Generic);
}

#[tokio::test]
async fn unrecognized_site_classifies_generic() {
    let server = MockServer::start().await;

    Mock::given(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(page_html("Docs", "hand-written docs")),
        )
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::Generic);
}

#[tokio::test]
async fn generator_markers_classify_mkdocs() {
    let server = MockServer::start().await;

    Mock::given(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><meta name="generator" content="mkdocs-1.6"></head><body></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::MkDocs);
}

#[tokio::test]
async fn rejected_head_retried_once_as_get() {
    let server = MockServer::start().await;

    // Server rejects HEAD outright; the GET fallback must run exactly once
    Mock::given(method("HEAD"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sphinx_inventory(
            "guide demo:doc -1 guide.html -\n",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::Sphinx);
}

#[tokio::test]
async fn rate_limit_during_detection_propagates() {
    let server = MockServer::start().await;

    // Every probe of objects.inv is throttled; detection must fail with the
    // rate limit instead of mis-detecting Generic
    Mock::given(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    Mock::given(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SITEMAP))
        .expect(0)
        .mount(&server)
        .await;

    let (fetcher, _) = test_fetcher(&test_config());
    let err = detect_format(&fetcher, &base_url(&server))
        .await
        .expect_err("detection should fail");

    assert!(err.is_rate_limited(), "expected RateLimited, got: {}", err);
}

#[tokio::test]
async fn retry_after_is_honored_before_retrying() {
    let server = MockServer::start().await;

    // First probe is throttled with Retry-After: 1; the retry must not start
    // earlier, and then succeeds
    Mock::given(method("HEAD"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/objects.inv"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (fetcher, sink) = test_fetcher(&test_config());
    let started = Instant::now();
    let format = detect_format(&fetcher, &base_url(&server)).await.unwrap();

    assert_eq!(format, DocFormat::Sphinx);
    assert!(
        started.elapsed().as_millis() >= 1000,
        "retry started before the server-requested delay elapsed"
    );

    let messages = sink.messages();
    assert!(
        messages.iter().any(|m| m.contains("Rate limited")),
        "expected a rate-limit wait to be reported, got: {:?}",
        messages
    );
}
