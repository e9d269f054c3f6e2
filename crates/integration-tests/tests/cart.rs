//! Session cart tests over the HTMX endpoints.
//!
//! The cart lives in the session, so these run without a database.

#![allow(clippy::unwrap_used)]

use atmos_integration_tests::TestApp;
use axum::http::StatusCode;

const BLUSH_DEPOSIT: &str = "color=blush-chrome&country=us&payment_option=deposit";

#[tokio::test]
async fn test_adding_same_variant_merges_lines() {
    let mut app = TestApp::new();

    let resp = app
        .post_form("/cart/add", &format!("{BLUSH_DEPOSIT}&quantity=1"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers.get("hx-trigger").unwrap(), "cart-updated");
    assert!(resp.session_cookie().is_some());

    let resp = app
        .post_form("/cart/add", &format!("{BLUSH_DEPOSIT}&quantity=2"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains('3'));

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["total_items"], 3);
    assert_eq!(cart["items"][0]["id"], "blush-chrome-us-deposit");
}

#[tokio::test]
async fn test_different_variants_are_separate_lines() {
    let mut app = TestApp::new();

    app.post_form("/cart/add", BLUSH_DEPOSIT).await;
    app.post_form(
        "/cart/add",
        "color=rose-gold&country=us&payment_option=full&quantity=1",
    )
    .await;

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total_items"], 2);
}

#[tokio::test]
async fn test_quantity_zero_removes_line() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", BLUSH_DEPOSIT).await;

    let resp = app
        .post_form("/cart/update", "id=blush-chrome-us-deposit&quantity=0")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your cart is empty"));

    let cart = app.get("/api/cart").await.json();
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_quantity_over_limit_is_rejected() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", BLUSH_DEPOSIT).await;

    let resp = app
        .post_form("/cart/update", "id=blush-chrome-us-deposit&quantity=100")
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let cart = app.get("/api/cart").await.json();
    assert_eq!(cart["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn test_unknown_country_is_rejected() {
    let mut app = TestApp::new();

    let resp = app
        .post_form(
            "/cart/add",
            "color=blush-chrome&country=atlantis&payment_option=deposit",
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_page_renders_lines() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", BLUSH_DEPOSIT).await;

    let resp = app.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Blush Chrome"));
    assert!(resp.body.contains("$50.00"));
}
