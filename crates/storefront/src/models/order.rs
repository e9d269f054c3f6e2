//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use atmos_core::{CurrencyCode, Customer, OrderId, OrderLine, Price};

/// A recorded checkout.
///
/// There is at most one order per Stripe payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub payment_intent_id: String,
    pub idempotency_key: Option<Uuid>,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total formatted for display, e.g. `US$650.00`.
    #[must_use]
    pub fn total_display(&self) -> String {
        Price::new(self.total_amount, self.currency).display()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}
