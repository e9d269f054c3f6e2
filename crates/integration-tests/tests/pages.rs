//! Static marketing pages and the 404 fallback.

#![allow(clippy::unwrap_used)]

use atmos_integration_tests::TestApp;
use axum::http::{StatusCode, header};

#[tokio::test]
async fn test_marketing_pages_render() {
    let mut app = TestApp::new();

    for (path, heading) in [
        ("/about", "Reconnecting Humanity"),
        ("/collection", "V1 Collection"),
        ("/halo", "Atmos Halo"),
        ("/faq", "Frequently Asked Questions"),
    ] {
        let resp = app.get(path).await;
        assert_eq!(resp.status, StatusCode::OK, "{path}");
        assert!(resp.body.contains(heading), "{path}");
    }
}

#[tokio::test]
async fn test_halo_page_shows_catalog_prices() {
    let mut app = TestApp::new();

    let resp = app.get("/halo").await;
    assert!(resp.body.contains("$600.00"));
    assert!(resp.body.contains("$50.00"));
}

#[tokio::test]
async fn test_collection_lists_every_finish() {
    let mut app = TestApp::new();

    let resp = app.get("/collection").await;
    for finish in ["Blush Chrome", "Ice Chrome", "Rose Gold"] {
        assert!(resp.body.contains(finish), "{finish}");
    }
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let mut app = TestApp::new();

    let resp = app.get("/lucid").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("Page Not Found"));
    assert!(
        resp.headers
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
}

#[tokio::test]
async fn test_script_nonce_matches_csp_header() {
    let mut app = TestApp::new();

    let resp = app.get("/faq").await;
    let csp = resp
        .headers
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap();
    assert!(!nonce.is_empty());
    assert!(resp.body.contains(&format!("nonce=\"{nonce}\"")));
}
