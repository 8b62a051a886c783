//! Cart route handlers.
//!
//! The cart lives in the session as (product id, quantity) lines and is
//! priced against the current catalog on every read. Checkout is the only
//! place prices get snapshotted.

use axum::{
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use craftloom_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{Cart, PricedCart, session_keys};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Load the cart from the session, defaulting to empty.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await
        .map_err(|e| AppError::Internal(format!("session load failed: {e}")))?;
    Ok(cart.unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("session save failed: {e}")))
}

/// Add-to-cart body.
#[derive(Debug, Deserialize)]
pub struct AddToCartBody {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Quantity update body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartBody {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Line removal body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartBody {
    pub product_id: ProductId,
}

/// Cart count badge payload.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

async fn priced(state: &AppState, cart: &Cart) -> Result<PricedCart> {
    let service = CartService::new(ProductRepository::new(state.pool()));
    Ok(service.price(cart).await?)
}

/// The priced cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<PricedCart>> {
    let cart = load_cart(&session).await?;
    Ok(Json(priced(&state, &cart).await?))
}

/// Add a product to the cart, merging with an existing line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartBody>,
) -> Result<Json<PricedCart>> {
    // Reject ids that aren't in the catalog instead of carrying dead lines
    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound(format!("product {}", body.product_id)));
    }

    let mut cart = load_cart(&session).await?;
    cart.add(body.product_id, body.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    Ok(Json(priced(&state, &cart).await?))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateCartBody>,
) -> Result<Json<PricedCart>> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(body.product_id, body.quantity);
    save_cart(&session, &cart).await?;

    Ok(Json(priced(&state, &cart).await?))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RemoveFromCartBody>,
) -> Result<Json<PricedCart>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(body.product_id);
    save_cart(&session, &cart).await?;

    Ok(Json(priced(&state, &cart).await?))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartCount>> {
    save_cart(&session, &Cart::default()).await?;
    Ok(Json(CartCount { count: 0 }))
}

/// Item count across all lines.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}
