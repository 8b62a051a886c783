//! Checkout totals, the order-creation saga, and order ownership.
//!
//! Order creation is a two-step saga, not a transaction: the order row is
//! committed first, then all line rows in one statement. When the line
//! insert fails, the already-committed order row is deleted as
//! compensation. The caller learns which phase failed and whether
//! compensation ran through [`CheckoutError`].
//!
//! Totals are computed once at checkout from the priced cart and stored on
//! the order; nothing ever recomputes them from the catalog afterwards.

use craftloom_core::{OrderId, PaymentMethod, Price};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{NewOrder, NewOrderLine, Order, ShippingDetails};
use crate::services::identity::Identity;

/// Flat shipping fee in rupees, charged on every order.
pub const SHIPPING_FLAT_FEE_RUPEES: i64 = 100;

/// Phase of the checkout saga, reported on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Nothing has been written yet.
    Started,
    /// The order row is committed; lines are not.
    OrderCommitted,
    /// Order and lines are both committed.
    LinesCommitted,
    /// The line insert failed and the order row was deleted.
    RolledBack,
}

/// Errors from placing an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The cart had no lines.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// A line total or the order total overflowed.
    #[error("order total out of range")]
    TotalOverflow,

    /// A store write failed. `phase` says how far the saga got:
    /// `Started` means nothing was written, `RolledBack` means the order
    /// row was written and then compensated away.
    #[error("order could not be placed")]
    Store {
        phase: CheckoutPhase,
        #[source]
        source: RepositoryError,
    },

    /// The line insert failed AND the compensating delete failed, leaving
    /// an order row with no lines behind.
    #[error("order {order_id} left without lines after failed rollback")]
    CompensationFailed {
        order_id: OrderId,
        #[source]
        source: RepositoryError,
    },
}

/// Order-store seam for the checkout saga.
pub trait OrderWriter {
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl OrderWriter for OrderRepository<'_> {
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        Self::insert_order(self, order).await
    }

    async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError> {
        Self::insert_lines(self, order_id, lines).await
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        Self::delete_order(self, order_id).await
    }
}

/// Checkout money breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct OrderTotals {
    /// Sum of `price_at_purchase * quantity` over all lines.
    pub subtotal: Price,
    /// The flat shipping fee.
    pub shipping: Price,
    /// `subtotal + shipping`.
    pub total: Price,
}

impl OrderTotals {
    /// Compute totals for a set of priced lines.
    ///
    /// Returns `None` if any line total or the grand total overflows.
    #[must_use]
    pub fn compute(lines: &[NewOrderLine], shipping: Price) -> Option<Self> {
        let mut subtotal = Price::ZERO;
        for line in lines {
            let line_total = line.price_at_purchase.times(line.quantity)?;
            subtotal = subtotal.checked_add(line_total)?;
        }
        let total = subtotal.checked_add(shipping)?;
        Some(Self {
            subtotal,
            shipping,
            total,
        })
    }
}

/// Everything the purchaser submits at checkout.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    /// Cart lines already priced from the catalog.
    pub lines: Vec<NewOrderLine>,
}

/// The checkout saga.
pub struct CheckoutService<W> {
    writer: W,
    shipping_fee: Price,
}

impl<W: OrderWriter> CheckoutService<W> {
    /// Create a checkout service charging `shipping_fee` per order.
    pub const fn new(writer: W, shipping_fee: Price) -> Self {
        Self {
            writer,
            shipping_fee,
        }
    }

    /// Place an order: compute totals, commit the order row, commit the
    /// lines, and compensate by deleting the order if the lines fail.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] on an empty cart, a total overflow, or a
    /// store failure. After an error no order is visible, except for the
    /// explicitly reported [`CheckoutError::CompensationFailed`] case.
    pub async fn place_order(&self, checkout: PlaceOrder) -> Result<Order, CheckoutError> {
        if checkout.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let totals = OrderTotals::compute(&checkout.lines, self.shipping_fee)
            .ok_or(CheckoutError::TotalOverflow)?;

        let order = self
            .writer
            .insert_order(&NewOrder {
                customer_name: checkout.customer_name,
                customer_phone: checkout.customer_phone,
                shipping: checkout.shipping,
                subtotal: totals.subtotal,
                shipping_cost: totals.shipping,
                total_amount: totals.total,
                payment_method: checkout.payment_method,
                payment_id: checkout.payment_id,
            })
            .await
            .map_err(|source| CheckoutError::Store {
                phase: CheckoutPhase::Started,
                source,
            })?;

        if let Err(source) = self.writer.insert_lines(order.id, &checkout.lines).await {
            tracing::warn!(order_id = %order.id, error = %source, "line insert failed, rolling back order");
            return match self.writer.delete_order(order.id).await {
                Ok(()) => Err(CheckoutError::Store {
                    phase: CheckoutPhase::RolledBack,
                    source,
                }),
                Err(delete_error) => {
                    tracing::error!(
                        order_id = %order.id,
                        error = %delete_error,
                        "compensating delete failed, order row is orphaned"
                    );
                    Err(CheckoutError::CompensationFailed {
                        order_id: order.id,
                        source: delete_error,
                    })
                }
            };
        }

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        Ok(order)
    }
}

/// Whether an identity owns an order, by the loose purchaser match against
/// the order's name/phone snapshot.
#[must_use]
pub fn purchaser_owns(identity: &Identity, order: &Order) -> bool {
    identity
        .purchaser_match()
        .matches(order.customer_phone.as_deref(), &order.customer_name)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use craftloom_core::{Email, OrderStatus, ProductId};

    use super::*;

    fn line(rupees: i64, quantity: u32) -> NewOrderLine {
        NewOrderLine {
            product_id: ProductId::random(),
            quantity,
            price_at_purchase: Price::from_rupees(rupees),
        }
    }

    fn shipping_details() -> ShippingDetails {
        ShippingDetails {
            address_line1: "12 Weaver Lane".to_owned(),
            address_line2: None,
            city: "Jaipur".to_owned(),
            state: "Rajasthan".to_owned(),
            pincode: "302001".to_owned(),
        }
    }

    fn checkout(lines: Vec<NewOrderLine>) -> PlaceOrder {
        PlaceOrder {
            customer_name: "Asha K".to_owned(),
            customer_phone: Some("9876543210".to_owned()),
            shipping: shipping_details(),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_id: None,
            lines,
        }
    }

    #[derive(Default)]
    struct FakeWriter {
        orders: Mutex<Vec<Order>>,
        lines: Mutex<Vec<(OrderId, usize)>>,
        fail_order: bool,
        fail_lines: bool,
        fail_delete: bool,
    }

    impl FakeWriter {
        fn order_count(&self) -> usize {
            self.orders.lock().expect("lock").len()
        }
    }

    impl OrderWriter for &FakeWriter {
        async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
            if self.fail_order {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            let stored = Order {
                id: OrderId::random(),
                customer_name: order.customer_name.clone(),
                customer_phone: order.customer_phone.clone(),
                shipping: order.shipping.clone(),
                subtotal: order.subtotal,
                shipping_cost: order.shipping_cost,
                total_amount: order.total_amount,
                payment_method: order.payment_method,
                payment_id: order.payment_id.clone(),
                status: OrderStatus::Processing,
                cancellation_reason: None,
                created_at: Utc::now(),
            };
            self.orders.lock().expect("lock").push(stored.clone());
            Ok(stored)
        }

        async fn insert_lines(
            &self,
            order_id: OrderId,
            lines: &[NewOrderLine],
        ) -> Result<(), RepositoryError> {
            if self.fail_lines {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            self.lines.lock().expect("lock").push((order_id, lines.len()));
            Ok(())
        }

        async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
            if self.fail_delete {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            self.orders.lock().expect("lock").retain(|o| o.id != order_id);
            Ok(())
        }
    }

    #[test]
    fn test_totals_add_flat_shipping() {
        // 2 x 100 + 1 x 50 = 250, plus the flat 100 fee.
        let totals = OrderTotals::compute(
            &[line(100, 2), line(50, 1)],
            Price::from_rupees(SHIPPING_FLAT_FEE_RUPEES),
        )
        .expect("no overflow");
        assert_eq!(totals.subtotal, Price::from_rupees(250));
        assert_eq!(totals.shipping, Price::from_rupees(100));
        assert_eq!(totals.total, Price::from_rupees(350));
    }

    #[test]
    fn test_totals_empty_cart_is_just_shipping() {
        let totals =
            OrderTotals::compute(&[], Price::from_rupees(100)).expect("no overflow");
        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.total, Price::from_rupees(100));
    }

    #[tokio::test]
    async fn test_place_order_commits_order_and_lines() {
        let writer = FakeWriter::default();
        let service = CheckoutService::new(&writer, Price::from_rupees(100));

        let order = service
            .place_order(checkout(vec![line(100, 2), line(50, 1)]))
            .await
            .expect("place");

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total_amount, Price::from_rupees(350));
        assert_eq!(writer.order_count(), 1);
        assert_eq!(writer.lines.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_place_order_rejects_empty_cart() {
        let writer = FakeWriter::default();
        let service = CheckoutService::new(&writer, Price::from_rupees(100));

        let result = service.place_order(checkout(Vec::new())).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(writer.order_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_line_insert_rolls_back_the_order() {
        let writer = FakeWriter {
            fail_lines: true,
            ..FakeWriter::default()
        };
        let service = CheckoutService::new(&writer, Price::from_rupees(100));

        let result = service.place_order(checkout(vec![line(100, 1)])).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Store {
                phase: CheckoutPhase::RolledBack,
                ..
            })
        ));
        // The compensating delete removed the committed order row.
        assert_eq!(writer.order_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_rollback_is_reported_with_the_orphaned_id() {
        let writer = FakeWriter {
            fail_lines: true,
            fail_delete: true,
            ..FakeWriter::default()
        };
        let service = CheckoutService::new(&writer, Price::from_rupees(100));

        let result = service.place_order(checkout(vec![line(100, 1)])).await;
        let Err(CheckoutError::CompensationFailed { order_id, .. }) = result else {
            panic!("expected CompensationFailed, got {result:?}");
        };
        let orders = writer.orders.lock().expect("lock");
        assert!(orders.iter().any(|o| o.id == order_id));
    }

    #[tokio::test]
    async fn test_failed_order_insert_writes_nothing() {
        let writer = FakeWriter {
            fail_order: true,
            ..FakeWriter::default()
        };
        let service = CheckoutService::new(&writer, Price::from_rupees(100));

        let result = service.place_order(checkout(vec![line(100, 1)])).await;
        assert!(matches!(
            result,
            Err(CheckoutError::Store {
                phase: CheckoutPhase::Started,
                ..
            })
        ));
        assert_eq!(writer.order_count(), 0);
        assert!(writer.lines.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_purchaser_owns_matches_phone_or_name() {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some(Email::parse("asha.k@crafts.example").expect("valid email")),
            phone: Some("9876543210".to_owned()),
            name: Some("Asha K".to_owned()),
        };
        let mut order = Order {
            id: OrderId::random(),
            customer_name: "someone else".to_owned(),
            customer_phone: Some("9876543210".to_owned()),
            shipping: shipping_details(),
            subtotal: Price::from_rupees(100),
            shipping_cost: Price::from_rupees(100),
            total_amount: Price::from_rupees(200),
            payment_method: PaymentMethod::Razorpay,
            payment_id: Some("pay_123".to_owned()),
            status: OrderStatus::Delivered,
            cancellation_reason: None,
            created_at: Utc::now(),
        };
        assert!(purchaser_owns(&identity, &order));

        order.customer_phone = Some("0000000000".to_owned());
        assert!(!purchaser_owns(&identity, &order));

        order.customer_name = "Asha K".to_owned();
        assert!(purchaser_owns(&identity, &order));
    }
}
