//! Product configurator route handler.
//!
//! Lists every finish, destination and payment option; the form posts to
//! `/cart/add` and the cart badge updates through HTMX.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use atmos_core::catalog::{Availability, COUNTRIES, Country, DEFAULT_COUNTRY};
use atmos_core::{Color, PaymentOption};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::middleware::session::load_cart;
use crate::state::AppState;

use super::cart::format_price;

/// Finish option for the template.
pub struct ColorOption {
    pub slug: &'static str,
    pub name: &'static str,
    pub image: &'static str,
    pub selected: bool,
}

/// Payment option for the template.
pub struct PaymentChoice {
    pub slug: &'static str,
    pub name: &'static str,
    pub price: String,
    pub selected: bool,
}

/// Destination option for the template.
pub struct CountryOption {
    pub code: &'static str,
    pub name: &'static str,
    pub coming_soon: bool,
    pub selected: bool,
}

impl From<&Country> for CountryOption {
    fn from(country: &Country) -> Self {
        Self {
            code: country.code,
            name: country.name,
            coming_soon: country.availability == Availability::Soon,
            selected: country.code == DEFAULT_COUNTRY,
        }
    }
}

/// Configurator page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchase.html")]
pub struct PurchaseTemplate {
    pub colors: Vec<ColorOption>,
    pub payment_options: Vec<PaymentChoice>,
    pub countries: Vec<CountryOption>,
    pub cart_count: u32,
    pub analytics: AnalyticsConfig,
    pub nonce: String,
}

/// Display the configurator.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;

    let colors = Color::ALL
        .iter()
        .map(|color| ColorOption {
            slug: color.slug(),
            name: color.display_name(),
            image: color.image_path(),
            selected: *color == Color::default(),
        })
        .collect();

    let payment_options = PaymentOption::ALL
        .iter()
        .map(|option| PaymentChoice {
            slug: option.slug(),
            name: option.display_name(),
            price: format_price(option.unit_price()),
            selected: *option == PaymentOption::default(),
        })
        .collect();

    Ok(PurchaseTemplate {
        colors,
        payment_options,
        countries: COUNTRIES.iter().map(CountryOption::from).collect(),
        cart_count: cart.total_items(),
        analytics: state.config().analytics.clone(),
        nonce,
    })
}
