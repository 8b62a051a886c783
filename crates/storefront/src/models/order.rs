//! Order domain types.
//!
//! Orders identify their purchaser by a name/phone snapshot, not an identity
//! foreign key; see `craftloom_core::PurchaserMatch` for the matching policy.
//! Line items snapshot the price at purchase so later catalog price changes
//! never alter historical totals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use craftloom_core::{OrderId, OrderLineId, OrderStatus, PaymentMethod, Price, ProductId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchaser name as entered at checkout.
    pub customer_name: String,
    /// Purchaser phone as entered at checkout, if given.
    pub customer_phone: Option<String>,
    /// Shipping destination.
    pub shipping: ShippingDetails,
    /// Sum of line totals at purchase time.
    pub subtotal: Price,
    /// Flat shipping fee charged on this order.
    pub shipping_cost: Price,
    /// `subtotal + shipping_cost`, fixed at purchase time.
    pub total_amount: Price,
    /// How the order was paid.
    pub payment_method: PaymentMethod,
    /// Gateway payment reference, for online payments.
    pub payment_id: Option<String>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Reason given when the order was cancelled.
    pub cancellation_reason: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of an order, with the price snapshotted at purchase.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Owning order.
    pub order_id: OrderId,
    /// Product purchased.
    pub product_id: ProductId,
    /// Quantity purchased.
    pub quantity: u32,
    /// Unit price at the moment of purchase.
    pub price_at_purchase: Price,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    /// The order row.
    #[serde(flatten)]
    pub order: Order,
    /// Its line items.
    pub lines: Vec<OrderLine>,
}

/// Shipping destination fields captured at checkout.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct ShippingDetails {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Data for a new order row (before the saga commits it).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub shipping: ShippingDetails,
    pub subtotal: Price,
    pub shipping_cost: Price,
    pub total_amount: Price,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
}

/// Data for a new order line.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Price,
}

/// Purchaser snapshot of a delivered order, as consumed by the review
/// eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchaser {
    /// Stored purchaser phone, if any.
    pub phone: Option<String>,
    /// Stored purchaser name.
    pub name: String,
}
