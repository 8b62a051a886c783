//! Checkout route handler.
//!
//! Turns the session cart into an order: prices the cart one last time,
//! snapshots those prices into order lines, and runs the order-creation
//! saga. The cart is cleared only after the saga commits.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use craftloom_core::PaymentMethod;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Cart, Order, ShippingDetails};
use crate::routes::cart::{load_cart, save_cart};
use crate::services::cart::{CartService, order_lines};
use crate::services::orders::{CheckoutService, PlaceOrder};
use crate::state::AppState;

/// Checkout body.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    /// Purchaser name; defaults to the identity's display name.
    pub customer_name: Option<String>,
    /// Purchaser phone; defaults to the identity's phone.
    pub customer_phone: Option<String>,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    /// Gateway payment reference, recorded verbatim for online payments.
    pub payment_id: Option<String>,
}

/// Place an order from the session cart.
#[instrument(skip(state, session, identity, body))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(identity): RequireAuth,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<Order>)> {
    let cart = load_cart(&session).await?;

    let priced = CartService::new(ProductRepository::new(state.pool()))
        .price(&cart)
        .await?;
    let lines = order_lines(&priced);

    let customer_name = body
        .customer_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| identity.display_name().map(str::to_owned))
        .unwrap_or_default();
    let customer_phone = body.customer_phone.or_else(|| identity.phone.clone());

    let order = CheckoutService::new(
        OrderRepository::new(state.pool()),
        state.config().shipping_flat_fee,
    )
    .place_order(PlaceOrder {
        customer_name,
        customer_phone,
        shipping: body.shipping,
        payment_method: body.payment_method,
        payment_id: body.payment_id,
        lines,
    })
    .await?;

    // The order is committed; a failed cart clear must not fail the request
    if let Err(e) = save_cart(&session, &Cart::default()).await {
        tracing::warn!(order_id = %order.id, error = %e, "failed to clear cart after checkout");
    }

    Ok((StatusCode::CREATED, Json(order)))
}
