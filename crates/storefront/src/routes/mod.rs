//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (hero, features, FAQ, waitlist)
//! GET  /purchase               - Product configurator
//! GET  /about                  - About page
//! GET  /collection             - V1 collection of finishes
//! GET  /halo                   - Halo product page
//! GET  /faq                    - Full FAQ
//! *                            - 404 page for anything unmatched
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /api/cart               - Cart as JSON
//!
//! # Checkout
//! GET  /checkout               - Checkout page (redirects to /purchase when empty)
//! GET  /checkout/success       - Order confirmation
//! POST /api/checkout/payment-intent - Create Stripe payment intent
//! POST /api/checkout/complete       - Verify payment and record order
//!
//! # Waitlist
//! POST /waitlist               - Landing page form (HTMX fragments)
//! POST /api/waitlist           - Join (JSON, origin-checked, CORS)
//! GET  /api/waitlist/count     - Active entry count
//! GET  /api/waitlist/stats     - Aggregate statistics
//! POST /api/waitlist/unsubscribe - Unsubscribe an email
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod purchase;
pub mod waitlist;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::{
    api_rate_limiter, require_allowed_origin, waitlist_cors_layer, waitlist_rate_limiter,
};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout page routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/success", get(checkout::success))
}

/// Create the JSON API routes for cart and checkout.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::api_cart))
        .route(
            "/checkout/payment-intent",
            post(checkout::create_payment_intent),
        )
        .route("/checkout/complete", post(checkout::complete))
        .route_layer(api_rate_limiter())
}

/// Create the waitlist API router.
///
/// Writes get the strict per-IP limiter, reads the relaxed one. The whole
/// API is origin-checked and answers CORS for the marketing site.
pub fn waitlist_api_routes(state: &AppState) -> Router<AppState> {
    let writes = Router::new()
        .route("/", post(waitlist::join))
        .route("/unsubscribe", post(waitlist::unsubscribe))
        .route_layer(waitlist_rate_limiter());

    let reads = Router::new()
        .route("/count", get(waitlist::count))
        .route("/stats", get(waitlist::stats))
        .route_layer(api_rate_limiter());

    writes
        .merge(reads)
        .layer(from_fn_with_state(state.clone(), require_allowed_origin))
        .layer(waitlist_cors_layer(&state.config().waitlist.allowed_origin))
}

/// Create all routes for the storefront.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Pages
        .route("/", get(home::home))
        .route("/purchase", get(purchase::show))
        .route("/about", get(pages::about))
        .route("/collection", get(pages::collection))
        .route("/halo", get(pages::halo))
        .route("/faq", get(pages::faq))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout pages
        .nest("/checkout", checkout_routes())
        // Landing page waitlist form
        .route(
            "/waitlist",
            post(waitlist::join_form).route_layer(waitlist_rate_limiter()),
        )
        // JSON APIs
        .nest("/api/waitlist", waitlist_api_routes(state))
        .nest("/api", api_routes())
        .fallback(pages::not_found)
}
