//! Order repository.
//!
//! An order and its lines are written in one transaction. The unique
//! constraint on `payment_intent_id` guarantees one order per payment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use atmos_core::{
    Color, CurrencyCode, Customer, NewOrder, OrderId, OrderLine, OrderType, PaymentOption,
};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str =
    "id, payment_intent_id, idempotency_key, customer, total_amount, currency, created_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    payment_intent_id: String,
    idempotency_key: Option<Uuid>,
    customer: Json<Customer>,
    total_amount: Decimal,
    currency: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    line_id: String,
    color: String,
    country: String,
    payment_option: String,
    order_type: OrderType,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let corrupt = |e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid order line {}: {e}", row.line_id))
        };
        let color = row.color.parse::<Color>().map_err(|e| corrupt(&e))?;
        let payment_option = row
            .payment_option
            .parse::<PaymentOption>()
            .map_err(|e| corrupt(&e))?;
        let quantity = u32::try_from(row.quantity).map_err(|e| corrupt(&e))?;

        Ok(Self {
            line_id: row.line_id,
            color,
            country: row.country,
            payment_option,
            order_type: row.order_type,
            quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
        })
    }
}

fn into_order(row: OrderRow, lines: Vec<OrderLine>) -> Result<Order, RepositoryError> {
    let currency = row
        .currency
        .parse::<CurrencyCode>()
        .map_err(RepositoryError::DataCorruption)?;

    Ok(Order {
        id: OrderId::new(row.id),
        payment_intent_id: row.payment_intent_id,
        idempotency_key: row.idempotency_key,
        customer: row.customer.0,
        lines,
        total_amount: row.total_amount,
        currency,
        created_at: row.created_at,
    })
}

/// Repository for order database operations.
#[derive(Clone, Copy)]
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the order recorded for a payment intent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM storefront."order" WHERE payment_intent_id = $1"#
        ))
        .bind(payment_intent_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.lines(row.id).await?;
                into_order(row, lines).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM storefront."order" WHERE id = $1"#
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.lines(row.id).await?;
                into_order(row, lines).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn lines(&self, order_id: i64) -> Result<Vec<OrderLine>, RepositoryError> {
        sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT line_id, color, country, payment_option, order_type,
                   quantity, unit_price, total_price
            FROM storefront.order_line
            WHERE order_id = $1
            ORDER BY position
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderLine::try_from)
        .collect()
    }

    /// Record an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if an order already exists for the
    /// payment intent.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO storefront."order"
                (payment_intent_id, idempotency_key, customer_email, customer, total_amount, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order.payment_intent_id)
        .bind(order.idempotency_key)
        .bind(order.customer.email.as_str())
        .bind(Json(&order.customer))
        .bind(order.total_amount)
        .bind(order.currency.stripe_code())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "payment intent already recorded"))?;

        for (position, line) in order.lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity out of range: {}", line.quantity))
            })?;
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption("too many order lines".to_owned())
            })?;

            sqlx::query(
                r"
                INSERT INTO storefront.order_line
                    (order_id, position, line_id, color, country, payment_option,
                     order_type, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(row.id)
            .bind(position)
            .bind(&line.line_id)
            .bind(line.color.slug())
            .bind(&line.country)
            .bind(line.payment_option.slug())
            .bind(line.order_type)
            .bind(quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        into_order(row, order.lines.clone())
    }
}
