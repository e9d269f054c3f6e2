//! Checkout sequencing: payment intent, then order record.
//!
//! 1. [`CheckoutService::create_payment_intent`] prices the session cart and
//!    asks the gateway for a payment intent, keyed by the checkout's
//!    idempotency key so a resubmitted form reuses the same intent.
//! 2. The browser confirms the payment with Stripe.js.
//! 3. [`CheckoutService::complete`] reads the intent back, checks that it is
//!    paid and that the amount still matches the cart, and records the order.
//!    Recording is idempotent per payment intent, so a client that lost the
//!    response can retry step 3 safely.
//!
//! Nothing here touches the session; the caller clears the cart only after
//! `complete` returns `Ok`.

use std::future::Future;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use atmos_core::checkout::idempotency_key;
use atmos_core::{Cart, CurrencyCode, Customer, CustomerInfoError, NewOrder, to_minor_units};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::Order;
use crate::services::stripe::{
    CreatePaymentIntent, PaymentIntent, PaymentIntentStatus, StripeClient, StripeError,
    is_payment_intent_id,
};

/// Metadata key carrying the idempotency key on the payment intent.
pub const IDEMPOTENCY_METADATA_KEY: &str = "idempotency_key";

/// Errors from the checkout sequence.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    InvalidCustomer(#[from] CustomerInfoError),

    #[error("order total {0} cannot be charged")]
    InvalidAmount(Decimal),

    #[error("invalid payment intent id")]
    InvalidPaymentIntent,

    #[error("payment not completed (status {0})")]
    PaymentIncomplete(&'static str),

    #[error("payment amount {actual} {currency} does not match cart total {expected}")]
    AmountMismatch {
        expected: i64,
        actual: i64,
        currency: String,
    },

    #[error("payment gateway error: {0}")]
    Gateway(#[from] StripeError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CheckoutError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::EmptyCart
            | Self::InvalidCustomer(_)
            | Self::InvalidAmount(_)
            | Self::InvalidPaymentIntent => StatusCode::BAD_REQUEST,
            Self::PaymentIncomplete(_) => StatusCode::PAYMENT_REQUIRED,
            Self::AmountMismatch { .. } => StatusCode::CONFLICT,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the customer.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty".to_owned(),
            Self::InvalidCustomer(e) => capitalize(&e.to_string()),
            Self::InvalidAmount(_) => "Order total is out of range".to_owned(),
            Self::InvalidPaymentIntent => "Invalid payment reference".to_owned(),
            Self::PaymentIncomplete(_) => {
                "Payment has not completed. Please try again.".to_owned()
            }
            Self::AmountMismatch { .. } => {
                "Your cart changed during payment. Please review your order.".to_owned()
            }
            Self::Gateway(_) => "Payment service error. Please try again.".to_owned(),
            Self::Repository(_) => {
                "Failed to record your order. Please try again.".to_owned()
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Payment processor operations.
pub trait PaymentGateway: Send + Sync {
    fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> impl Future<Output = Result<PaymentIntent, StripeError>> + Send;

    fn retrieve_payment_intent(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<PaymentIntent, StripeError>> + Send;
}

impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, StripeError> {
        Self::create_payment_intent(self, params).await
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        Self::retrieve_payment_intent(self, id).await
    }
}

/// Order storage operations.
pub trait OrderStore: Send + Sync {
    fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Record an order. A second order for the same payment intent is
    /// `RepositoryError::Conflict`.
    fn record(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

impl OrderStore for OrderRepository<'_> {
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        self.get_by_payment_intent(payment_intent_id).await
    }

    async fn record(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.create(order).await
    }
}

/// What the browser needs to confirm a payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentCreated {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Charged amount in major units.
    pub amount: Decimal,
    pub currency: &'static str,
}

/// Checkout orchestration over a gateway and an order store.
pub struct CheckoutService<G, O> {
    gateway: G,
    orders: O,
    currency: CurrencyCode,
}

impl<G: PaymentGateway, O: OrderStore> CheckoutService<G, O> {
    #[must_use]
    pub const fn new(gateway: G, orders: O, currency: CurrencyCode) -> Self {
        Self {
            gateway,
            orders,
            currency,
        }
    }

    /// Create a payment intent for the cart total.
    ///
    /// The amount always comes from `cart`. `nonce` identifies the checkout
    /// session and, with the cart and every request parameter, feeds the
    /// idempotency key.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` / `CheckoutError::InvalidAmount` before
    ///   any network call
    /// - `CheckoutError::Gateway` if Stripe rejects the request
    #[tracing::instrument(skip_all, fields(items = cart.total_items()))]
    pub async fn create_payment_intent(
        &self,
        cart: &Cart,
        customer: &Customer,
        nonce: Uuid,
    ) -> Result<PaymentIntentCreated, CheckoutError> {
        let amount = charge_amount(cart)?;

        let mut params = CreatePaymentIntent {
            amount,
            currency: self.currency,
            receipt_email: Some(customer.email.to_string()),
            metadata: vec![
                ("customerName".to_owned(), customer.full_name()),
                ("customerEmail".to_owned(), customer.email.to_string()),
                (
                    "customerPhone".to_owned(),
                    customer.phone.clone().unwrap_or_default(),
                ),
            ],
            idempotency_key: None,
        };
        // Stripe rejects a reused key whose parameters differ, so the key
        // covers everything sent except itself.
        let form = params.form();
        let key = idempotency_key(
            nonce,
            cart,
            form.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        params
            .metadata
            .push((IDEMPOTENCY_METADATA_KEY.to_owned(), key.to_string()));
        params.idempotency_key = Some(key);

        let intent = self.gateway.create_payment_intent(&params).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            StripeError::Parse("payment intent returned without client_secret".to_owned())
        })?;

        tracing::info!(payment_intent_id = %intent.id, amount, "payment intent created");

        Ok(PaymentIntentCreated {
            client_secret,
            payment_intent_id: intent.id,
            amount: cart.total_price(),
            currency: self.currency.stripe_code(),
        })
    }

    /// Verify the payment and record the order.
    ///
    /// If an order already exists for `payment_intent_id` it is returned
    /// unchanged, even when `cart` has since been cleared.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::PaymentIncomplete` if the intent is not paid
    /// - `CheckoutError::AmountMismatch` if the intent does not cover the cart
    /// - `CheckoutError::Gateway` / `CheckoutError::Repository` on I/O failure
    #[tracing::instrument(skip(self, cart, customer))]
    pub async fn complete(
        &self,
        cart: &Cart,
        customer: Customer,
        payment_intent_id: &str,
    ) -> Result<Order, CheckoutError> {
        if !is_payment_intent_id(payment_intent_id) {
            return Err(CheckoutError::InvalidPaymentIntent);
        }

        if let Some(existing) = self.orders.find_by_payment_intent(payment_intent_id).await? {
            tracing::info!(order_id = %existing.id, "order already recorded");
            return Ok(existing);
        }

        let expected = charge_amount(cart)?;
        let intent = self
            .gateway
            .retrieve_payment_intent(payment_intent_id)
            .await?;

        if !intent.status.is_paid() {
            return Err(CheckoutError::PaymentIncomplete(intent.status.as_str()));
        }
        if intent.amount != expected
            || !intent
                .currency
                .eq_ignore_ascii_case(self.currency.stripe_code())
        {
            tracing::warn!(
                expected,
                actual = intent.amount,
                currency = %intent.currency,
                "payment amount does not match cart"
            );
            return Err(CheckoutError::AmountMismatch {
                expected,
                actual: intent.amount,
                currency: intent.currency,
            });
        }

        let key = intent
            .metadata
            .get(IDEMPOTENCY_METADATA_KEY)
            .and_then(|k| Uuid::parse_str(k).ok());
        let new_order = NewOrder::from_cart(cart, customer, &intent.id, key, self.currency);

        match self.orders.record(&new_order).await {
            Ok(order) => {
                tracing::info!(
                    order_id = %order.id,
                    total = %order.total_amount,
                    "order recorded"
                );
                Ok(order)
            }
            // Recorded by a concurrent retry
            Err(RepositoryError::Conflict(_)) => self
                .orders
                .find_by_payment_intent(&intent.id)
                .await?
                .ok_or(CheckoutError::Repository(RepositoryError::NotFound)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Cart total in minor units, rejecting empty carts and unchargeable totals.
fn charge_amount(cart: &Cart) -> Result<i64, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let total = cart.total_price();
    to_minor_units(total)
        .filter(|amount| *amount > 0)
        .ok_or(CheckoutError::InvalidAmount(total))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use atmos_core::{Color, CustomerInfo, NewCartItem, OrderId, PaymentOption};
    use chrono::Utc;

    use super::*;

    /// In-memory gateway that holds idempotency keys to Stripe's rule: a
    /// reused key must carry identical parameters.
    #[derive(Default)]
    struct FakeGateway {
        created: Mutex<Vec<CreatePaymentIntent>>,
        intents: Mutex<HashMap<String, PaymentIntent>>,
        keyed_requests: Mutex<HashMap<Uuid, Vec<(String, String)>>>,
    }

    impl FakeGateway {
        fn set_status(&self, id: &str, status: PaymentIntentStatus) {
            if let Some(intent) = self.intents.lock().unwrap().get_mut(id) {
                intent.status = status;
            }
        }

        /// Register an intent that Stripe created outside this checkout.
        fn insert(&self, intent: PaymentIntent) {
            self.intents.lock().unwrap().insert(intent.id.clone(), intent);
        }

        fn set_amount(&self, id: &str, amount: i64) {
            if let Some(intent) = self.intents.lock().unwrap().get_mut(id) {
                intent.amount = amount;
            }
        }
    }

    impl PaymentGateway for FakeGateway {
        async fn create_payment_intent(
            &self,
            params: &CreatePaymentIntent,
        ) -> Result<PaymentIntent, StripeError> {
            let key = params.idempotency_key.unwrap();
            let form = params.form();
            let mut keyed = self.keyed_requests.lock().unwrap();
            if keyed.get(&key).is_some_and(|first| *first != form) {
                return Err(StripeError::Api {
                    status: 400,
                    code: Some("idempotency_error".to_owned()),
                    message: "Keys for idempotent requests can only be used with the same \
                              parameters they were first used with."
                        .to_owned(),
                });
            }
            keyed.insert(key, form);
            drop(keyed);

            let id = format!("pi_{}", key.simple());
            let intent = PaymentIntent {
                id: id.clone(),
                client_secret: Some(format!("{id}_secret_test")),
                amount: params.amount,
                currency: params.currency.stripe_code().to_owned(),
                status: PaymentIntentStatus::RequiresPaymentMethod,
                metadata: params.metadata.iter().cloned().collect(),
            };
            self.created.lock().unwrap().push(params.clone());
            // Same idempotency key returns the original intent
            Ok(self
                .intents
                .lock()
                .unwrap()
                .entry(id)
                .or_insert(intent)
                .clone())
        }

        async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
            self.intents
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| StripeError::Api {
                    status: 404,
                    code: Some("resource_missing".to_owned()),
                    message: "No such payment_intent".to_owned(),
                })
        }
    }

    /// Unique per payment intent, like the `order` table.
    #[derive(Default)]
    struct MemoryOrderStore {
        orders: Mutex<Vec<Order>>,
        fail_next: AtomicBool,
    }

    impl OrderStore for MemoryOrderStore {
        async fn find_by_payment_intent(
            &self,
            payment_intent_id: &str,
        ) -> Result<Option<Order>, RepositoryError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.payment_intent_id == payment_intent_id)
                .cloned())
        }

        async fn record(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            let mut orders = self.orders.lock().unwrap();
            if orders
                .iter()
                .any(|o| o.payment_intent_id == order.payment_intent_id)
            {
                return Err(RepositoryError::Conflict("payment intent".to_owned()));
            }
            let recorded = Order {
                id: OrderId::new(i64::try_from(orders.len()).unwrap() + 1),
                payment_intent_id: order.payment_intent_id.clone(),
                idempotency_key: order.idempotency_key,
                customer: order.customer.clone(),
                lines: order.lines.clone(),
                total_amount: order.total_amount,
                currency: order.currency,
                created_at: Utc::now(),
            };
            orders.push(recorded.clone());
            Ok(recorded)
        }
    }

    fn customer() -> Customer {
        CustomerInfo {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
            address: "12 St James's Square".to_owned(),
            city: "London".to_owned(),
            zip_code: "SW1Y 4JH".to_owned(),
            country: "gb".to_owned(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(NewCartItem {
            color: Color::BlushChrome,
            country: "us".to_owned(),
            payment_option: PaymentOption::Full,
            quantity: 1,
        })
        .unwrap();
        cart.add_item(NewCartItem {
            color: Color::IceChrome,
            country: "us".to_owned(),
            payment_option: PaymentOption::Deposit,
            quantity: 1,
        })
        .unwrap();
        cart
    }

    fn service() -> CheckoutService<FakeGateway, MemoryOrderStore> {
        CheckoutService::new(
            FakeGateway::default(),
            MemoryOrderStore::default(),
            CurrencyCode::USD,
        )
    }

    #[tokio::test]
    async fn test_payment_intent_uses_cart_total_and_metadata() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(7))
            .await
            .unwrap();

        assert_eq!(created.amount, Decimal::new(650, 0));
        assert_eq!(created.currency, "usd");
        assert!(created.client_secret.ends_with("_secret_test"));

        let params = service.gateway.created.lock().unwrap()[0].clone();
        assert_eq!(params.amount, 65_000);
        assert_eq!(params.receipt_email.as_deref(), Some("ada@example.com"));
        let metadata: HashMap<_, _> = params.metadata.into_iter().collect();
        assert_eq!(metadata["customerName"], "Ada Lovelace");
        assert_eq!(metadata["customerEmail"], "ada@example.com");
        assert_eq!(metadata["customerPhone"], "+44 20 7946 0000");
        assert!(metadata.contains_key(IDEMPOTENCY_METADATA_KEY));
    }

    #[tokio::test]
    async fn test_resubmitted_payment_intent_is_reused() {
        let service = service();
        let nonce = Uuid::from_u128(7);
        let first = service
            .create_payment_intent(&cart(), &customer(), nonce)
            .await
            .unwrap();
        let second = service
            .create_payment_intent(&cart(), &customer(), nonce)
            .await
            .unwrap();
        assert_eq!(first.payment_intent_id, second.payment_intent_id);

        let mut bigger = cart();
        bigger
            .update_quantity("ice-chrome-us-deposit", 2)
            .unwrap();
        let third = service
            .create_payment_intent(&bigger, &customer(), nonce)
            .await
            .unwrap();
        assert_ne!(first.payment_intent_id, third.payment_intent_id);
    }

    #[tokio::test]
    async fn test_corrected_contact_details_get_a_new_intent() {
        let service = service();
        let nonce = Uuid::from_u128(8);
        let first = service
            .create_payment_intent(&cart(), &customer(), nonce)
            .await
            .unwrap();

        // Same checkout, the customer fixes a typo in their name
        let mut renamed = customer();
        renamed.last_name = "King".to_owned();
        let second = service
            .create_payment_intent(&cart(), &renamed, nonce)
            .await
            .unwrap();
        assert_ne!(first.payment_intent_id, second.payment_intent_id);

        // ...or drops the phone number
        let mut no_phone = customer();
        no_phone.phone = None;
        let third = service
            .create_payment_intent(&cart(), &no_phone, nonce)
            .await
            .unwrap();
        assert_ne!(first.payment_intent_id, third.payment_intent_id);
        assert_ne!(second.payment_intent_id, third.payment_intent_id);

        // An unchanged resubmit still collapses onto the first intent
        let again = service
            .create_payment_intent(&cart(), &customer(), nonce)
            .await
            .unwrap();
        assert_eq!(first.payment_intent_id, again.payment_intent_id);
    }

    #[tokio::test]
    async fn test_gateway_rejects_reused_key_with_new_parameters() {
        let gateway = FakeGateway::default();
        let mut params = CreatePaymentIntent {
            amount: 65_000,
            currency: CurrencyCode::USD,
            receipt_email: None,
            metadata: vec![("customerName".to_owned(), "Ada Lovelace".to_owned())],
            idempotency_key: Some(Uuid::from_u128(9)),
        };
        gateway.create_payment_intent(&params).await.unwrap();

        params.metadata[0].1 = "Ada King".to_owned();
        let err = gateway.create_payment_intent(&params).await.unwrap_err();
        assert!(matches!(
            err,
            StripeError::Api { status: 400, code: Some(ref c), .. } if c == "idempotency_error"
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_gateway() {
        let service = service();
        let err = service
            .create_payment_intent(&Cart::new(), &customer(), Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(service.gateway.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_records_order_once() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(1))
            .await
            .unwrap();
        service
            .gateway
            .set_status(&created.payment_intent_id, PaymentIntentStatus::Succeeded);

        let order = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap();
        assert_eq!(order.total_amount, Decimal::new(650, 0));
        assert_eq!(order.lines.len(), 2);
        assert!(order.idempotency_key.is_some());

        // Retry after the cart was cleared returns the same order
        let again = service
            .complete(&Cart::new(), customer(), &created.payment_intent_id)
            .await
            .unwrap();
        assert_eq!(again.id, order.id);
        assert_eq!(service.orders.orders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_intents_sharing_a_key_are_both_recorded() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(5))
            .await
            .unwrap();
        service
            .gateway
            .set_status(&created.payment_intent_id, PaymentIntentStatus::Succeeded);

        // Stripe expired the key and a later request minted a second intent
        let mut later = service
            .gateway
            .retrieve_payment_intent(&created.payment_intent_id)
            .await
            .unwrap();
        later.id = "pi_later".to_owned();
        service.gateway.insert(later);

        let first = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap();
        let second = service
            .complete(&cart(), customer(), "pi_later")
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.idempotency_key, second.idempotency_key);
        assert_eq!(service.orders.orders.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_complete_can_be_retried_after_record_fails() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(6))
            .await
            .unwrap();
        service
            .gateway
            .set_status(&created.payment_intent_id, PaymentIntentStatus::Succeeded);

        service.orders.fail_next.store(true, Ordering::SeqCst);
        let err = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // The card was charged; the browser retries complete alone
        let order = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap();
        assert_eq!(order.payment_intent_id, created.payment_intent_id);
        assert_eq!(service.gateway.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_processing_counts_as_paid() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(2))
            .await
            .unwrap();
        service
            .gateway
            .set_status(&created.payment_intent_id, PaymentIntentStatus::Processing);
        assert!(
            service
                .complete(&cart(), customer(), &created.payment_intent_id)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_unpaid_intent_is_not_recorded() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(3))
            .await
            .unwrap();
        let err = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::PaymentIncomplete("requires_payment_method")
        ));
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
        assert!(service.orders.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amount_mismatch_is_not_recorded() {
        let service = service();
        let created = service
            .create_payment_intent(&cart(), &customer(), Uuid::from_u128(4))
            .await
            .unwrap();
        service
            .gateway
            .set_status(&created.payment_intent_id, PaymentIntentStatus::Succeeded);
        service.gateway.set_amount(&created.payment_intent_id, 5_000);

        let err = service
            .complete(&cart(), customer(), &created.payment_intent_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::AmountMismatch {
                expected: 65_000,
                actual: 5_000,
                ..
            }
        ));
        assert!(service.orders.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payment_intent_id() {
        let err = service()
            .complete(&cart(), customer(), "../v1/charges")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidPaymentIntent));
    }

    #[tokio::test]
    async fn test_unknown_payment_intent_is_gateway_error() {
        let err = service()
            .complete(&cart(), customer(), "pi_doesnotexist")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Gateway(_)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_customer_error_message_is_capitalized() {
        let err = CheckoutError::from(CustomerInfoError::Missing("city"));
        assert_eq!(err.public_message(), "City is required");
    }
}
