//! Checkout route handlers.
//!
//! The checkout page renders the order summary and customer form; Stripe.js
//! then drives the two API calls below. Amounts are always taken from the
//! session cart, never from the request body.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use atmos_core::{CustomerInfo, OrderId};

use crate::config::AnalyticsConfig;
use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::middleware::session::{
    checkout_nonce, finish_checkout, last_payment_intent, load_cart,
};
use crate::models::Order;
use crate::services::checkout::PaymentIntentCreated;
use crate::services::stripe::is_payment_intent_id;
use crate::state::AppState;

use super::cart::{CartView, format_price};

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub publishable_key: String,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Order line display data for the success page.
pub struct OrderLineView {
    pub color: &'static str,
    pub payment_option: &'static str,
    pub quantity: u32,
    pub line_price: String,
}

/// Order display data for the success page.
pub struct OrderView {
    pub id: OrderId,
    pub customer_name: String,
    pub email: String,
    pub lines: Vec<OrderLineView>,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer.full_name(),
            email: order.customer.email.to_string(),
            lines: order
                .lines
                .iter()
                .map(|line| OrderLineView {
                    color: line.color.display_name(),
                    payment_option: line.payment_option.display_name(),
                    quantity: line.quantity,
                    line_price: format_price(line.total_price),
                })
                .collect(),
            total: order.total_display(),
        }
    }
}

/// Checkout success page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub order: Option<OrderView>,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Body for `POST /api/checkout/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteCheckoutRequest {
    pub payment_intent_id: String,
    pub customer: CustomerInfo,
}

/// Response for a recorded order.
#[derive(Debug, Serialize)]
pub struct CheckoutCompleted {
    pub success: bool,
    pub order_id: OrderId,
    pub redirect_url: String,
}

/// Query string Stripe appends to the return URL.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub payment_intent: Option<String>,
}

/// Display the checkout page, or send an empty cart back to the configurator.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/purchase").into_response());
    }

    Ok(CheckoutTemplate {
        cart: CartView::from(&cart),
        publishable_key: state.config().stripe.publishable_key.clone(),
        analytics: state.config().analytics.clone(),
        nonce,
    }
    .into_response())
}

/// Create a payment intent for the session cart.
#[instrument(skip_all)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    session: Session,
    Json(info): Json<CustomerInfo>,
) -> Result<Json<PaymentIntentCreated>> {
    let customer = info.validate().map_err(crate::services::CheckoutError::from)?;
    let cart = load_cart(&session).await?;
    let nonce = checkout_nonce(&session).await?;

    let created = state
        .checkout()
        .create_payment_intent(&cart, &customer, nonce)
        .await?;

    add_breadcrumb(
        "checkout",
        "Payment intent created",
        Some(&[("payment_intent_id", created.payment_intent_id.as_str())]),
    );
    Ok(Json(created))
}

/// Verify the payment and record the order.
///
/// The cart is cleared only after the order is stored; on any error it is
/// left intact so the customer can retry.
#[instrument(skip_all, fields(payment_intent_id = %request.payment_intent_id))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CompleteCheckoutRequest>,
) -> Result<Json<CheckoutCompleted>> {
    let customer = request
        .customer
        .validate()
        .map_err(crate::services::CheckoutError::from)?;
    let cart = load_cart(&session).await?;

    let order = state
        .checkout()
        .complete(&cart, customer, &request.payment_intent_id)
        .await?;

    finish_checkout(&session, &order.payment_intent_id).await?;
    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order recorded", Some(&[("order_id", order_id.as_str())]));

    Ok(Json(CheckoutCompleted {
        success: true,
        order_id: order.id,
        redirect_url: format!("/checkout/success?payment_intent={}", order.payment_intent_id),
    }))
}

/// Order confirmation page.
///
/// Order details are shown only to the session that completed the payment;
/// anyone else holding the link gets the generic confirmation. The generic
/// page also covers an order that is still being recorded.
#[instrument(skip(state, session, nonce))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SuccessQuery>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let last = last_payment_intent(&session).await?;
    let order = match owned_payment_intent(query.payment_intent.as_deref(), last.as_deref()) {
        Some(id) => OrderRepository::new(state.pool())
            .get_by_payment_intent(id)
            .await
            .map_err(AppError::from)?
            .as_ref()
            .map(OrderView::from),
        None => None,
    };

    Ok(CheckoutSuccessTemplate {
        order,
        analytics: state.config().analytics.clone(),
        nonce,
    })
}

/// The requested payment intent, if it is the one this session paid.
fn owned_payment_intent<'a>(requested: Option<&'a str>, last: Option<&str>) -> Option<&'a str> {
    requested.filter(|id| is_payment_intent_id(id) && Some(*id) == last)
}
