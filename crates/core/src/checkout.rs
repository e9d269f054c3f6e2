//! Checkout inputs and order records.
//!
//! [`CustomerInfo`] is what the checkout form posts; [`Customer`] is the
//! cleaned version that flows into the payment request and the order.
//! [`NewOrder`] snapshots a cart at the moment payment is confirmed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::catalog::{Color, PaymentOption};
use crate::types::{CurrencyCode, Email, EmailError, OrderType};

/// Cap on single-line text fields.
pub const FIELD_MAX_CHARS: usize = 200;
/// Cap on the order notes field.
pub const NOTES_MAX_CHARS: usize = 1000;

/// Namespace for checkout idempotency keys.
const IDEMPOTENCY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_9b3d_5e07_a8c1_4d2f_7e90_b3a6);

/// Customer form rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerInfoError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Customer details as posted by the checkout form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub notes: String,
}

/// Validated customer details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    pub country: String,
    pub notes: Option<String>,
}

impl Customer {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CustomerInfoError> {
    optional(value, field, FIELD_MAX_CHARS)?.ok_or(CustomerInfoError::Missing(field))
}

fn optional(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, CustomerInfoError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max {
        return Err(CustomerInfoError::TooLong { field, max });
    }
    Ok(Some(value.to_owned()))
}

impl CustomerInfo {
    /// Trim every field and check required fields and lengths.
    ///
    /// # Errors
    ///
    /// Returns the first [`CustomerInfoError`] in form order.
    pub fn validate(&self) -> Result<Customer, CustomerInfoError> {
        let first_name = required(&self.first_name, "first name")?;
        let last_name = required(&self.last_name, "last name")?;
        if self.email.trim().is_empty() {
            return Err(CustomerInfoError::Missing("email"));
        }
        let email = Email::normalize(&self.email)?;
        let phone = optional(&self.phone, "phone", FIELD_MAX_CHARS)?;
        let company = optional(&self.company, "company", FIELD_MAX_CHARS)?;
        let address = required(&self.address, "address")?;
        let city = required(&self.city, "city")?;
        let state = optional(&self.state, "state", FIELD_MAX_CHARS)?;
        let zip_code = required(&self.zip_code, "zip code")?;
        let country = required(&self.country, "country")?;
        let notes = optional(&self.notes, "notes", NOTES_MAX_CHARS)?;

        Ok(Customer {
            first_name,
            last_name,
            email,
            phone,
            company,
            address,
            city,
            state,
            zip_code,
            country,
            notes,
        })
    }
}

/// Deterministic key for one checkout attempt.
///
/// `request` is every parameter sent with the payment request. Same nonce,
/// same cart contents and same parameters give the same key, so a
/// resubmitted payment request is collapsed by the processor. Changing the
/// cart or any parameter (a corrected name or phone number included) yields
/// a new key, so a key is never replayed with different parameters.
///
/// Parameter order does not matter.
#[must_use]
pub fn idempotency_key<'a>(
    nonce: Uuid,
    cart: &Cart,
    request: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Uuid {
    let mut pairs: Vec<_> = request.into_iter().collect();
    pairs.sort_unstable();

    let mut name = format!("{nonce}|{}", cart.fingerprint());
    for (key, value) in pairs {
        // Length-prefixed so no value can spoof a field boundary
        name.push_str(&format!("|{}:{key}={}:{value}", key.len(), value.len()));
    }
    Uuid::new_v5(&IDEMPOTENCY_NAMESPACE, name.as_bytes())
}

/// A cart line frozen into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub color: Color,
    pub country: String,
    pub payment_option: PaymentOption,
    pub order_type: OrderType,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            line_id: item.id.clone(),
            color: item.color,
            country: item.country.clone(),
            payment_option: item.payment_option,
            order_type: item.payment_option.order_type(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

/// An order ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub payment_intent_id: String,
    pub idempotency_key: Option<Uuid>,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
}

impl NewOrder {
    /// Snapshot `cart` for the given payment.
    #[must_use]
    pub fn from_cart(
        cart: &Cart,
        customer: Customer,
        payment_intent_id: impl Into<String>,
        idempotency_key: Option<Uuid>,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            payment_intent_id: payment_intent_id.into(),
            idempotency_key,
            customer,
            lines: cart.items().iter().map(OrderLine::from).collect(),
            total_amount: cart.total_price(),
            currency,
        }
    }
}
