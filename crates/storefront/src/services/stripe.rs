//! Stripe API client for payment intents.
//!
//! A thin form-encoded client over the two calls the checkout needs:
//! creating a payment intent and reading it back after the browser has
//! confirmed it with Stripe.js.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use atmos_core::CurrencyCode;

use crate::config::StripeConfig;

/// Pinned Stripe API version.
const API_VERSION: &str = "2023-10-16";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Lifecycle state of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    /// Whether the customer has completed payment from our side.
    ///
    /// `Processing` counts: the funds are on their way and Stripe reports
    /// failures asynchronously.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Succeeded | Self::Processing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

/// Payment intent resource (the fields we read).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Only returned to the secret-key holder; handed to Stripe.js.
    pub client_secret: Option<String>,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Parameters for creating a payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    /// Amount in minor units.
    pub amount: i64,
    pub currency: CurrencyCode,
    pub receipt_email: Option<String>,
    pub metadata: Vec<(String, String)>,
    /// Sent as the `Idempotency-Key` header.
    pub idempotency_key: Option<Uuid>,
}

impl CreatePaymentIntent {
    pub(crate) fn form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_owned(), self.amount.to_string()),
            ("currency".to_owned(), self.currency.stripe_code().to_owned()),
            (
                "automatic_payment_methods[enabled]".to_owned(),
                "true".to_owned(),
            ),
        ];
        if let Some(email) = &self.receipt_email {
            form.push(("receipt_email".to_owned(), email.clone()));
        }
        for (key, value) in &self.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }
        form
    }
}

/// Error envelope returned by Stripe.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        headers.insert("Stripe-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Create a payment intent.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response can't be parsed.
    pub async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, StripeError> {
        let url = format!("{}/v1/payment_intents", self.api_base);

        let mut request = self.client.post(&url).form(&params.form());
        if let Some(key) = params.idempotency_key {
            request = request.header("Idempotency-Key", key.to_string());
        }

        let response = request.send().await?;
        Self::parse(response).await
    }

    /// Fetch a payment intent by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response can't be parsed.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let url = format!("{}/v1/payment_intents/{id}", self.api_base);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (code, message) = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
                |_| (None, body.clone()),
                |envelope| {
                    (
                        envelope.error.code,
                        envelope.error.message.unwrap_or_default(),
                    )
                },
            );
            return Err(StripeError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Whether `id` looks like a payment intent ID (`pi_` followed by
/// alphanumerics). Guards the ID before it is put in a URL path.
#[must_use]
pub fn is_payment_intent_id(id: &str) -> bool {
    id.strip_prefix("pi_").is_some_and(|rest| {
        !rest.is_empty() && rest.len() <= 255 && rest.chars().all(|c| c.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encoding() {
        let params = CreatePaymentIntent {
            amount: 65_000,
            currency: CurrencyCode::USD,
            receipt_email: Some("ada@example.com".to_owned()),
            metadata: vec![("customerName".to_owned(), "Ada Lovelace".to_owned())],
            idempotency_key: None,
        };
        let form = params.form();
        assert!(form.contains(&("amount".to_owned(), "65000".to_owned())));
        assert!(form.contains(&("currency".to_owned(), "usd".to_owned())));
        assert!(form.contains(&(
            "automatic_payment_methods[enabled]".to_owned(),
            "true".to_owned()
        )));
        assert!(form.contains(&("receipt_email".to_owned(), "ada@example.com".to_owned())));
        assert!(form.contains(&(
            "metadata[customerName]".to_owned(),
            "Ada Lovelace".to_owned()
        )));
    }

    #[test]
    fn test_deserialize_payment_intent() {
        let json = r#"{
            "id": "pi_3Nq8Zf",
            "object": "payment_intent",
            "client_secret": "pi_3Nq8Zf_secret_abc",
            "amount": 5000,
            "currency": "usd",
            "status": "requires_payment_method",
            "metadata": {"customerEmail": "ada@example.com"}
        }"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.amount, 5000);
        assert_eq!(intent.status, PaymentIntentStatus::RequiresPaymentMethod);
        assert!(!intent.status.is_paid());
        assert_eq!(
            intent.metadata.get("customerEmail").map(String::as_str),
            Some("ada@example.com")
        );
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let json = r#"{"id":"pi_1","amount":1,"currency":"usd","status":"something_new"}"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.status, PaymentIntentStatus::Unknown);
        assert!(intent.client_secret.is_none());
    }

    #[test]
    fn test_paid_statuses() {
        assert!(PaymentIntentStatus::Succeeded.is_paid());
        assert!(PaymentIntentStatus::Processing.is_paid());
        assert!(!PaymentIntentStatus::RequiresAction.is_paid());
        assert!(!PaymentIntentStatus::Canceled.is_paid());
    }

    #[test]
    fn test_payment_intent_id_shape() {
        assert!(is_payment_intent_id("pi_3Nq8ZfK2vLx7RtY3"));
        assert!(!is_payment_intent_id("pi_"));
        assert!(!is_payment_intent_id("cus_123"));
        assert!(!is_payment_intent_id("pi_../../v1/charges"));
    }
}
