//! Order repository.
//!
//! Order creation is deliberately NOT wrapped in a database transaction:
//! the order row and its lines are two independent writes, and the checkout
//! saga in `services::orders` compensates by deleting the order row when
//! the line insert fails. This mirrors the store's original client, which
//! had no multi-table transactions at all.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use craftloom_core::{OrderId, OrderLineId, OrderStatus, PaymentMethod, Price, ProductId, PurchaserMatch};

use super::RepositoryError;
use crate::models::{NewOrder, NewOrderLine, Order, OrderLine, OrderWithLines, Purchaser, ShippingDetails};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    customer_phone: Option<String>,
    shipping_address_line1: String,
    shipping_address_line2: Option<String>,
    shipping_city: String,
    shipping_state: String,
    shipping_pincode: String,
    subtotal: Price,
    shipping_cost: Price,
    total_amount: Price,
    payment_method: String,
    payment_id: Option<String>,
    status: String,
    cancellation_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let payment_method: PaymentMethod = row.payment_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            shipping: ShippingDetails {
                address_line1: row.shipping_address_line1,
                address_line2: row.shipping_address_line2,
                city: row.shipping_city,
                state: row.shipping_state,
                pincode: row.shipping_pincode,
            },
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            total_amount: row.total_amount,
            payment_method,
            payment_id: row.payment_id,
            status,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price_at_purchase: Price,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order line {}",
                row.quantity, row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity,
            price_at_purchase: row.price_at_purchase,
        })
    }
}

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, shipping_address_line1, \
     shipping_address_line2, shipping_city, shipping_state, shipping_pincode, subtotal, \
     shipping_cost, total_amount, payment_method, payment_id, status, cancellation_reason, \
     created_at";

/// Repository for order reads and writes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order row in `Processing` status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, customer_name, customer_phone, shipping_address_line1,
                 shipping_address_line2, shipping_city, shipping_state, shipping_pincode,
                 subtotal, shipping_cost, total_amount, payment_method, payment_id, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(OrderId::random())
        .bind(&order.customer_name)
        .bind(order.customer_phone.as_deref())
        .bind(&order.shipping.address_line1)
        .bind(order.shipping.address_line2.as_deref())
        .bind(&order.shipping.city)
        .bind(&order.shipping.state)
        .bind(&order.shipping.pincode)
        .bind(order.subtotal)
        .bind(order.shipping_cost)
        .bind(order.total_amount)
        .bind(order.payment_method.as_str())
        .bind(order.payment_id.as_deref())
        .bind(OrderStatus::Processing.as_str())
        .fetch_one(self.pool)
        .await?;

        Order::try_from(row)
    }

    /// Insert all line rows for an order in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a quantity exceeds the
    /// column's integer range, and `RepositoryError::Database` if the
    /// insert fails; the caller is responsible for the compensating order
    /// delete.
    pub async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError> {
        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id.as_uuid()).collect();
        let quantities = line_quantities(lines)?;
        let prices: Vec<Decimal> = lines
            .iter()
            .map(|l| l.price_at_purchase.amount())
            .collect();

        sqlx::query(
            "INSERT INTO order_lines (id, order_id, product_id, quantity, price_at_purchase)
             SELECT gen_random_uuid(), $1, product_id, quantity, price
             FROM UNNEST($2::uuid[], $3::integer[], $4::numeric[])
                 AS t(product_id, quantity, price)",
        )
        .bind(order_id)
        .bind(product_ids)
        .bind(quantities)
        .bind(prices)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete an order row (the saga's compensating action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Get one order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_lines(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderWithLines>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Order::try_from(row)?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, quantity, price_at_purchase
             FROM order_lines WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderWithLines { order, lines }))
    }

    /// List a purchaser's orders newest-first, with lines.
    ///
    /// Purchaser identity is the loose phone-or-name string match; see
    /// [`PurchaserMatch`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_purchaser(
        &self,
        purchaser: &PurchaserMatch,
    ) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS}
             FROM orders
             WHERE ($1::text IS NOT NULL AND customer_phone = $1)
                OR ($2::text IS NOT NULL AND customer_name = $2)
             ORDER BY created_at DESC"
        ))
        .bind(purchaser.phone.as_deref())
        .bind(purchaser.name.as_deref())
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, quantity, price_at_purchase
             FROM order_lines WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let mut by_order: std::collections::HashMap<OrderId, Vec<OrderLine>> =
            std::collections::HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = by_order.remove(&order.id).unwrap_or_default();
                OrderWithLines { order, lines }
            })
            .collect())
    }

    /// Purchaser snapshots of all `Delivered` orders containing a product.
    ///
    /// This is the order-ledger query behind review purchase verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delivered_purchasers_of(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Purchaser>, RepositoryError> {
        let rows: Vec<(Option<String>, String)> = sqlx::query_as(
            "SELECT DISTINCT o.customer_phone, o.customer_name
             FROM orders o
             JOIN order_lines l ON l.order_id = o.id
             WHERE o.status = $1 AND l.product_id = $2",
        )
        .bind(OrderStatus::Delivered.as_str())
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(phone, name)| Purchaser { phone, name })
            .collect())
    }

    /// Cancel an order with a reason.
    ///
    /// No status precondition is applied; cancellation is unconditional,
    /// matching the store's original behavior.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn cancel(
        &self,
        order_id: OrderId,
        reason: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders
             SET status = $2, cancellation_reason = $3
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(OrderStatus::Cancelled.as_str())
        .bind(reason)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }
}

/// Convert line quantities to the column's integer type.
///
/// An out-of-range quantity must fail the insert rather than store a value
/// that disagrees with the totals computed from it.
fn line_quantities(lines: &[NewOrderLine]) -> Result<Vec<i32>, RepositoryError> {
    lines
        .iter()
        .map(|l| {
            i32::try_from(l.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "order line quantity {} exceeds integer range",
                    l.quantity
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftloom_core::{Price, ProductId};

    fn line(quantity: u32) -> NewOrderLine {
        NewOrderLine {
            product_id: ProductId::random(),
            quantity,
            price_at_purchase: Price::from_rupees(450),
        }
    }

    #[test]
    fn test_line_quantities_convert() {
        let quantities = line_quantities(&[line(1), line(3)]).expect("in range");
        assert_eq!(quantities, vec![1, 3]);
    }

    #[test]
    fn test_oversized_quantity_is_rejected() {
        let result = line_quantities(&[line(1), line(u32::MAX)]);
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
