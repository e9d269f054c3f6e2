//! Checkout guards that hold before Stripe is involved.

#![allow(clippy::unwrap_used)]

use atmos_integration_tests::TestApp;
use axum::http::{StatusCode, header};
use serde_json::json;

#[tokio::test]
async fn test_empty_cart_redirects_to_purchase() {
    let mut app = TestApp::new();

    let resp = app.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.headers.get(header::LOCATION).unwrap(), "/purchase");
}

#[tokio::test]
async fn test_checkout_page_carries_publishable_key() {
    let mut app = TestApp::new();
    app.post_form(
        "/cart/add",
        "color=ice-chrome&country=us&payment_option=full&quantity=1",
    )
    .await;

    let resp = app.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("pk_test_integration"));
    assert!(resp.body.contains("$600.00"));
}

#[tokio::test]
async fn test_payment_intent_requires_customer_fields() {
    let mut app = TestApp::new();
    app.post_form(
        "/cart/add",
        "color=ice-chrome&country=us&payment_option=full&quantity=1",
    )
    .await;

    let resp = app
        .post_json(
            "/api/checkout/payment-intent",
            &json!({ "first_name": "Ada", "email": "ada@example.com" }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json()["error"].as_str().unwrap().ends_with("is required"));
}

#[tokio::test]
async fn test_complete_rejects_malformed_payment_intent() {
    let mut app = TestApp::new();

    let resp = app
        .post_json(
            "/api/checkout/complete",
            &json!({
                "payment_intent_id": "not-an-intent",
                "customer": {
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "email": "ada@example.com",
                    "address": "1 Analytical Way",
                    "city": "London",
                    "state": "LDN",
                    "zip_code": "N1",
                    "country": "GB"
                }
            }),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_success_page_without_intent_shows_generic_confirmation() {
    let mut app = TestApp::new();

    let resp = app.get("/checkout/success").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your payment was received"));
}

#[tokio::test]
async fn test_success_page_hides_orders_from_other_sessions() {
    let mut app = TestApp::new();

    // A payment intent id this browser never paid: no lookup, no details
    let resp = app.get("/checkout/success?payment_intent=pi_3OtherCustomer").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your payment was received"));
    assert!(!resp.body.contains("Order #"));
}
