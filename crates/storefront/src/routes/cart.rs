//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; every mutation is a
//! load-modify-save of the session value.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use atmos_core::catalog::country_name;
use atmos_core::{Cart, CartItem, Color, NewCartItem, PaymentOption};

use crate::config::AnalyticsConfig;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::middleware::session::{load_cart, save_cart};
use crate::state::AppState;

/// HTMX event fired after any cart mutation.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Format an amount in dollars, e.g. `$650.00`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Cart line display data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub color: String,
    pub image: &'static str,
    pub country: String,
    pub payment_option: String,
    pub is_deposit: bool,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            color: item.color.display_name().to_owned(),
            image: item.color.image_path(),
            country: country_name(&item.country),
            payment_option: item.payment_option.display_name().to_owned(),
            is_deposit: item.payment_option == PaymentOption::Deposit,
            quantity: item.quantity,
            price: format_price(item.unit_price),
            line_price: format_price(item.total_price),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_price(cart.total_price()),
            item_count: cart.total_items(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub color: Color,
    pub country: String,
    pub payment_option: PaymentOption,
    pub quantity: Option<u32>,
}

/// Update cart form data. A quantity of zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// JSON view of the session cart.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub total_items: u32,
}

/// Display cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;

    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
        analytics: state.config().analytics.clone(),
        nonce,
    })
}

/// Add item to cart (HTMX).
///
/// Merges into an existing line for the same variant. Returns the new count
/// badge with an HTMX trigger so other cart widgets refresh.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;

    let line_id = cart
        .add_item(NewCartItem {
            color: form.color,
            country: form.country,
            payment_option: form.payment_option,
            quantity: form.quantity.unwrap_or(1),
        })?
        .id
        .clone();
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("line_id", line_id.as_str())]));
    tracing::info!(%line_id, items = cart.total_items(), "cart item added");

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(&form.id, form.quantity)?;
    save_cart(&session, &cart).await?;

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.remove_item(&form.id) {
        save_cart(&session, &cart).await?;
    }

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.total_items(),
    })
}

/// JSON view of the cart.
#[instrument(skip(session))]
pub async fn api_cart(session: Session) -> Result<Json<CartResponse>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartResponse {
        total_price: cart.total_price(),
        total_items: cart.total_items(),
        items: cart.items().to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(650, 0)), "$650.00");
        assert_eq!(format_price(Decimal::new(4999, 2)), "$49.99");
    }

    #[test]
    fn test_cart_view() {
        let mut cart = Cart::new();
        cart.add_item(NewCartItem {
            color: Color::BlackMist,
            country: "gb".to_owned(),
            payment_option: PaymentOption::Deposit,
            quantity: 2,
        })
        .ok();

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$100.00");
        let line = view.items.first().map(|l| (l.country.as_str(), l.is_deposit));
        assert_eq!(line, Some(("United Kingdom", true)));
    }
}
